use crate::constants::CODE_NEED_PASSWORD;
use crate::core_error::FtpError;
use crate::core_network::control::ControlChannel;
use crate::session::Session;
use log::info;
use tokio::io::{AsyncRead, AsyncWrite};

/// Handles the USER FTP command.
///
/// Remembers the name and asks for the password; nothing is checked yet.
pub async fn handle_user_command<S>(
    control: &mut ControlChannel<S>,
    session: &mut Session,
    username: String,
) -> Result<(), FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!("Received USER command with username: {}", username);

    control
        .send_reply(CODE_NEED_PASSWORD, &format!("Password required for {}", username))
        .await?;
    session.username = Some(username);
    Ok(())
}
