use anyhow::Result;
use clap::Parser;
use srvftp::core_auth::helper::load_credentials;
use srvftp::core_cli::ServerCli;
use srvftp::core_log::logger::init_logger;
use srvftp::{server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = ServerCli::parse();

    init_logger(args.verbose, "info");

    // Load configuration, then let the command line override it
    let mut config = Config::load_or_default(args.config.as_deref())?;
    config.server.listen_port = args.port;
    if let Some(users) = args.users {
        config.server.users_file = users;
    }
    if let Some(root) = args.root {
        config.server.root_dir = root;
    }

    let credentials = load_credentials(&config.server.users_file);

    server::run(config, credentials).await
}
