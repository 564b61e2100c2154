use crate::config::{Config, ServerConfig};
use crate::constants::{CODE_GOODBYE, CODE_GREETING, CODE_LOGIN_INCORRECT, SERVER_BANNER};
use crate::core_auth::CredentialStore;
use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::{dispatch_command, read_command, CommandOutcome};
use crate::core_ftpcommand::{pass, user};
use crate::core_network::control::ControlChannel;
use crate::session::{Session, SessionState};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

pub async fn start_server(
    listen_port: u16,
    config: Arc<Config>,
    credentials: Arc<CredentialStore>,
) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", listen_port))
        .await
        .with_context(|| format!("Error binding socket on port {}", listen_port))?;
    info!("Server listening on port {}", listen_port);

    serve(listener, config, credentials).await
}

const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause before retrying after `failures` consecutive accept errors.
/// Doubles from 10ms and settles at one second.
fn accept_backoff(failures: u32) -> Duration {
    let factor = 1u32 << failures.saturating_sub(1).min(7);
    ACCEPT_BACKOFF_BASE.saturating_mul(factor).min(ACCEPT_BACKOFF_MAX)
}

/// Accept loop. Each connection gets its own task; finished tasks are
/// reclaimed by the runtime without the loop ever waiting on them.
pub async fn serve(
    listener: TcpListener,
    config: Arc<Config>,
    credentials: Arc<CredentialStore>,
) -> Result<()> {
    let mut failures = 0u32;
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => {
                failures = 0;
                accepted
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                let pause = accept_backoff(failures);
                error!("Error accepting connection: {} (retrying in {:?})", e, pause);
                tokio::time::sleep(pause).await;
                continue;
            }
        };
        info!("New connection from {}", addr);

        let config = Arc::clone(&config);
        let credentials = Arc::clone(&credentials);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, addr, config, credentials).await {
                warn!("Connection error for {}: {}", addr, e);
            }
            info!("Connection closed for {}", addr);
        });
    }
}

/// Drives one control connection: greeting, login, then the command loop.
pub async fn handle_connection<S>(
    socket: S,
    peer_addr: SocketAddr,
    config: Arc<Config>,
    credentials: Arc<CredentialStore>,
) -> Result<(), FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut control = ControlChannel::new(socket);
    let mut session = Session::new(peer_addr, config.server.root_dir.clone());

    control.send_reply(CODE_GREETING, SERVER_BANNER).await?;

    session.transition(SessionState::Authenticating);
    if authenticate(&mut control, &credentials, &mut session).await? {
        session.transition(SessionState::Ready);
        operate(&mut control, &config.server, &mut session).await;
    }

    session.transition(SessionState::Closed);
    if let Err(e) = control.shutdown().await {
        debug!("Control shutdown for {}: {}", peer_addr, e);
    }
    Ok(())
}

/// USER then PASS, in that order. Any deviation ends the session with 530.
async fn authenticate<S>(
    control: &mut ControlChannel<S>,
    credentials: &CredentialStore,
    session: &mut Session,
) -> Result<bool, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let username = match read_command(control, Some(FtpCommand::USER)).await {
        Ok(command) => command.parameter_or_empty(),
        Err(e) => return refuse_login(control, session, e).await,
    };
    user::handle_user_command(control, session, username).await?;

    let password = match read_command(control, Some(FtpCommand::PASS)).await {
        Ok(command) => command.parameter_or_empty(),
        Err(e) => return refuse_login(control, session, e).await,
    };
    pass::handle_pass_command(control, credentials, session, password).await
}

async fn refuse_login<S>(
    control: &mut ControlChannel<S>,
    session: &Session,
    cause: FtpError,
) -> Result<bool, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match cause {
        FtpError::PeerClosed | FtpError::Io(_) => Err(cause),
        _ => {
            warn!("Login aborted for {}: {}", session.peer_addr, cause);
            control.send_reply(CODE_LOGIN_INCORRECT, "Login incorrect").await?;
            Ok(false)
        }
    }
}

/// Command loop of an authenticated session.
async fn operate<S>(control: &mut ControlChannel<S>, config: &ServerConfig, session: &mut Session)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let command = match read_command(control, None).await {
            Ok(command) => command,
            Err(e) => {
                end_session(control, session, e).await;
                break;
            }
        };
        debug!("Received command from {}: {}", session.peer_addr, command.verb);

        match dispatch_command(control, config, session, command).await {
            Ok(CommandOutcome::Continue) => {}
            Ok(CommandOutcome::Close) => break,
            Err(e) => {
                end_session(control, session, e).await;
                break;
            }
        }
    }
}

/// A peer that broke the protocol is told goodbye. A failed transport is not
/// written to again.
async fn end_session<S>(control: &mut ControlChannel<S>, session: &Session, cause: FtpError)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match cause {
        FtpError::PeerClosed => info!("Client {} disconnected", session.peer_addr),
        e if e.is_protocol_violation() => {
            warn!("Protocol violation from {}: {}", session.peer_addr, e);
            say_goodbye(control).await;
        }
        e => warn!("Control channel with {} failed: {}", session.peer_addr, e),
    }
}

/// Best-effort 221; the channel may already be gone.
async fn say_goodbye<S>(control: &mut ControlChannel<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(e) = control.send_reply(CODE_GOODBYE, "Goodbye").await {
        debug!("Goodbye not delivered: {}", e);
    }
}
