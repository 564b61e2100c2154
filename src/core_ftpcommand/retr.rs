use crate::config::ServerConfig;
use crate::constants::{
    CODE_CANT_OPEN_DATA, CODE_FILE_SIZE, CODE_FILE_UNAVAILABLE, CODE_SYNTAX_ERROR,
    CODE_TRANSFER_COMPLETE,
};
use crate::core_error::FtpError;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_network::control::ControlChannel;
use crate::core_network::data_channel::connect_data_channel;
use crate::core_transfer::{transfer_exact, TransferDirection};
use crate::session::Session;
use log::{info, warn};
use regex::Regex;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Text of the 299 reply that announces a download's length.
pub fn size_announcement(path: &str, size: u64) -> String {
    format!("File {} size {} bytes", path, size)
}

/// Pulls the byte count back out of a 299 reply text.
pub fn parse_size_announcement(text: &str) -> Result<u64, FtpError> {
    let re = Regex::new(r"size (\d+) bytes$").map_err(|e| FtpError::MalformedReply(e.to_string()))?;
    re.captures(text.trim_end())
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .ok_or_else(|| FtpError::MalformedReply(text.to_string()))
}

async fn open_for_download(path: &Path) -> std::io::Result<(File, u64)> {
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(ErrorKind::NotFound, "not a regular file"));
    }
    Ok((file, metadata.len()))
}

/// Handles the RETR (Retrieve) FTP command.
///
/// Sequence: open the file (550 if missing, with no data-channel activity),
/// connect out to the PORT endpoint, announce the size with 299, stream
/// exactly that many bytes, close the data channel, then reply 226.
/// The data connection is fully established before the announcement, so
/// the client can start reading as soon as it sees 299.
pub async fn handle_retr_command<S>(
    control: &mut ControlChannel<S>,
    config: &ServerConfig,
    session: &mut Session,
    arg: String,
) -> Result<CommandOutcome, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let endpoint = session.take_data_endpoint();

    if arg.trim().is_empty() {
        warn!("RETR command received with no arguments");
        control
            .send_reply(CODE_SYNTAX_ERROR, "Syntax error in parameters or arguments")
            .await?;
        return Ok(CommandOutcome::Continue);
    }

    let file_path = session.resolve_path(&arg);
    let (mut file, size) = match open_for_download(&file_path).await {
        Ok(found) => found,
        Err(e) => {
            warn!("Error opening file {}: {}", file_path.display(), e);
            control
                .send_reply(
                    CODE_FILE_UNAVAILABLE,
                    &format!("{}: no such file or directory", arg),
                )
                .await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    let Some(endpoint) = endpoint else {
        warn!("RETR from {} without a PORT endpoint", session.peer_addr);
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

    control
        .send_reply(CODE_FILE_SIZE, &size_announcement(&arg, size))
        .await?;
    info!("Sending file: {} ({} bytes) to {}", file_path.display(), size, endpoint);

    let outcome = transfer_exact(
        TransferDirection::Download,
        &mut file,
        &mut data,
        size,
        config.block_size(),
    )
    .await;

    if let Err(e) = data.shutdown().await {
        warn!("Error shutting down data stream: {}", e);
    }
    drop(data);

    control
        .send_reply(CODE_TRANSFER_COMPLETE, "Transfer complete")
        .await?;

    if outcome.is_complete() {
        info!("File transfer completed successfully: {}", file_path.display());
    } else {
        warn!(
            "File transfer of {} ended after {} of {} bytes",
            file_path.display(),
            outcome.transferred,
            outcome.expected
        );
    }
    Ok(CommandOutcome::Continue)
}
