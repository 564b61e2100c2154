use crate::config::ServerConfig;
use crate::constants::{
    CODE_CANT_OPEN_DATA, CODE_FILE_UNAVAILABLE, CODE_LOCAL_ERROR, CODE_OPENING_DATA,
    CODE_TRANSFER_COMPLETE, STOR_DELIMITER,
};
use crate::core_error::FtpError;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_network::control::ControlChannel;
use crate::core_network::data_channel::connect_data_channel;
use crate::core_transfer::{transfer_exact, TransferDirection};
use crate::session::Session;
use log::{error, info, warn};
use std::io::ErrorKind;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};

/// Joins a file name and its size into one STOR parameter: `name//size`.
pub fn encode_stor_parameter(name: &str, size: u64) -> String {
    format!("{}{}{}", name, STOR_DELIMITER, size)
}

/// Splits a STOR parameter on its last `//`.
pub fn parse_stor_parameter(arg: &str) -> Result<(String, u64), FtpError> {
    let invalid = || FtpError::InvalidStorParameter(arg.to_string());

    let (name, size) = arg.rsplit_once(STOR_DELIMITER).ok_or_else(invalid)?;
    if name.trim().is_empty() {
        return Err(invalid());
    }
    let size = size.trim().parse::<u64>().map_err(|_| invalid())?;
    Ok((name.to_string(), size))
}

/// Handles the STOR (Store File) FTP command.
///
/// The declared size is authoritative: exactly that many bytes are read
/// from the data channel into the target file before replying 226.
pub async fn handle_stor_command<S>(
    control: &mut ControlChannel<S>,
    config: &ServerConfig,
    session: &mut Session,
    arg: String,
) -> Result<CommandOutcome, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let endpoint = session.take_data_endpoint();
    let (name, size) = parse_stor_parameter(&arg)?;
    info!("Received STOR command for {} ({} bytes)", name, size);

    let Some(endpoint) = endpoint else {
        warn!("STOR from {} without a PORT endpoint", session.peer_addr);
        control.send_reply(CODE_CANT_OPEN_DATA, "Use PORT first").await?;
        return Ok(CommandOutcome::Continue);
    };

    let mut data = match connect_data_channel(endpoint, config.data_timeout()).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to connect to client {}: {}", endpoint, e);
            control
                .send_reply(CODE_CANT_OPEN_DATA, "Can't open data connection")
                .await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    let file_path = session.resolve_path(&name);
    let mut file = match File::create(&file_path).await {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to create file: {}, error: {}", file_path.display(), e);
            let (code, text) = match e.kind() {
                ErrorKind::NotFound => (CODE_FILE_UNAVAILABLE, format!("{}: no such file or directory", name)),
                ErrorKind::PermissionDenied => (CODE_FILE_UNAVAILABLE, format!("{}: permission denied", name)),
                _ => (CODE_LOCAL_ERROR, "Requested action aborted. Local error in processing".to_string()),
            };
            control.send_reply(code, &text).await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    control
        .send_reply(
            CODE_OPENING_DATA,
            &format!("Opening BINARY mode data connection for {} ({} bytes)", name, size),
        )
        .await?;

    let outcome = transfer_exact(
        TransferDirection::Upload,
        &mut data,
        &mut file,
        size,
        config.block_size(),
    )
    .await;
    drop(data);

    control
        .send_reply(CODE_TRANSFER_COMPLETE, "Transfer complete")
        .await?;

    if outcome.is_complete() {
        info!("File stored successfully: {}", file_path.display());
    } else {
        warn!(
            "Upload of {} ended after {} of {} bytes",
            file_path.display(),
            outcome.transferred,
            outcome.expected
        );
    }
    Ok(CommandOutcome::Continue)
}
