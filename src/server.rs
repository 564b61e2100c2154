use crate::core_auth::CredentialStore;
use crate::core_network::network;
use crate::helpers::log_config;
use crate::Config;
use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

/// Runs the FTP server with the provided configuration and credential list.
///
/// # Returns
///
/// Only returns on a fatal socket setup error.
pub async fn run(config: Config, credentials: CredentialStore) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    let listen_port = config.server.listen_port;
    match network::start_server(listen_port, Arc::new(config), Arc::new(credentials)).await {
        Ok(_) => info!("Server stopped."),
        Err(e) => {
            error!("Failed to start server: {:#}", e);
            return Err(e);
        }
    }

    Ok(())
}
