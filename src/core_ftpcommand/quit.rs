use crate::constants::CODE_GOODBYE;
use crate::core_error::FtpError;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_network::control::ControlChannel;
use crate::session::{Session, SessionState};
use log::info;
use tokio::io::{AsyncRead, AsyncWrite};

/// Handles the QUIT FTP command.
pub async fn handle_quit_command<S>(
    control: &mut ControlChannel<S>,
    session: &mut Session,
) -> Result<CommandOutcome, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!("Received QUIT command from {}. Closing connection.", session.peer_addr);
    control.send_reply(CODE_GOODBYE, "Goodbye").await?;
    session.transition(SessionState::Closed);
    Ok(CommandOutcome::Close)
}
