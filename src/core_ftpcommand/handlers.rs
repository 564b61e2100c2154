use crate::config::ServerConfig;
use crate::constants::{CODE_BAD_SEQUENCE, CODE_NOT_IMPLEMENTED};
use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::message::Command;
use crate::core_network::control::ControlChannel;
use crate::core_network::port;
use crate::session::Session;
use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

/// What the command loop does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Close,
}

/// Reads one command, optionally insisting on a specific verb.
///
/// A different verb than `expected` is a protocol violation; the caller
/// must end the session rather than route it elsewhere.
pub async fn read_command<S>(
    control: &mut ControlChannel<S>,
    expected: Option<FtpCommand>,
) -> Result<Command, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let command = control.read_request().await?;
    if let Some(expected) = expected {
        if command.verb != expected.as_str() {
            warn!("abnormal client flow: did not send {} command", expected);
            return Err(FtpError::UnexpectedCommand {
                expected: expected.to_string(),
                received: command.verb,
            });
        }
    }
    Ok(command)
}

/// Routes a command received after login to its handler.
pub async fn dispatch_command<S>(
    control: &mut ControlChannel<S>,
    config: &ServerConfig,
    session: &mut Session,
    command: Command,
) -> Result<CommandOutcome, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let arg = command.parameter_or_empty();

    match FtpCommand::from_str(&command.verb) {
        Some(FtpCommand::PORT) => port::handle_port_command(control, session, arg).await,
        Some(FtpCommand::RETR) => {
            crate::core_ftpcommand::retr::handle_retr_command(control, config, session, arg).await
        }
        Some(FtpCommand::STOR) => {
            crate::core_ftpcommand::stor::handle_stor_command(control, config, session, arg).await
        }
        Some(FtpCommand::QUIT) => {
            crate::core_ftpcommand::quit::handle_quit_command(control, session).await
        }
        Some(cmd @ (FtpCommand::USER | FtpCommand::PASS)) => {
            info!("{} sent {} after login", session.peer_addr, cmd);
            control
                .send_reply(CODE_BAD_SEQUENCE, "Already logged in")
                .await?;
            Ok(CommandOutcome::Continue)
        }
        None => {
            info!("Unrecognized command from {}: {}", session.peer_addr, command.verb);
            control
                .send_reply(
                    CODE_NOT_IMPLEMENTED,
                    &format!("{}: command not implemented", command.verb),
                )
                .await?;
            Ok(CommandOutcome::Continue)
        }
    }
}
