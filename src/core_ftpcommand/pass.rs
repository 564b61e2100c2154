use crate::constants::{CODE_LOGGED_IN, CODE_LOGIN_INCORRECT};
use crate::core_auth::CredentialStore;
use crate::core_error::FtpError;
use crate::core_network::control::ControlChannel;
use crate::session::Session;
use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

/// Handles the PASS FTP command. Returns whether the login succeeded.
pub async fn handle_pass_command<S>(
    control: &mut ControlChannel<S>,
    credentials: &CredentialStore,
    session: &mut Session,
    password: String,
) -> Result<bool, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let username = session.username.clone().unwrap_or_default();

    if !credentials.check_credentials(&username, &password) {
        warn!("Login incorrect for {} from {}", username, session.peer_addr);
        control.send_reply(CODE_LOGIN_INCORRECT, "Login incorrect").await?;
        return Ok(false);
    }

    info!("User {} logged in from {}", username, session.peer_addr);
    control
        .send_reply(CODE_LOGGED_IN, &format!("User {} logged in", username))
        .await?;
    Ok(true)
}
