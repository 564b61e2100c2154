//! Length-driven block copy shared by RETR and STOR on both ends.
//!
//! The announced size is authoritative: the loop moves exactly that many
//! bytes and never waits for end-of-stream past it.

use log::{debug, warn};
use std::fmt;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Server file to client file (RETR).
    Download,
    /// Client file to server file (STOR).
    Upload,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDirection::Download => f.write_str("download"),
            TransferDirection::Upload => f.write_str("upload"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    pub expected: u64,
    pub transferred: u64,
}

impl TransferOutcome {
    pub fn is_complete(&self) -> bool {
        self.transferred == self.expected
    }
}

/// Fills `block` unless the source ends first. Returns the bytes read.
async fn read_block<R>(source: &mut R, block: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < block.len() {
        match source.read(&mut block[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Copies exactly `size` bytes from `source` to `sink` in `block_size` blocks.
///
/// A failed read, or a source that ends early, is logged as a warning and
/// ends the loop. A failed write stops writing but the source is still
/// drained up to `size`, so the peer is never left with unread data.
/// The returned [`TransferOutcome`] counts only bytes that reached the sink.
/// Callers still owe the peer its terminal reply either way.
pub async fn transfer_exact<R, W>(
    direction: TransferDirection,
    source: &mut R,
    sink: &mut W,
    size: u64,
    block_size: usize,
) -> TransferOutcome
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let block_size = block_size.max(1);
    let mut buffer = vec![0u8; block_size];
    let mut remaining = size;
    let mut transferred = 0u64;
    let mut sink_failed = false;

    while remaining > 0 {
        let chunk = remaining.min(block_size as u64) as usize;

        let n = match read_block(source, &mut buffer[..chunk]).await {
            Ok(n) => n,
            Err(e) => {
                warn!("{} receive error after {} of {} bytes: {}", direction, transferred, size, e);
                break;
            }
        };

        if !sink_failed {
            match sink.write_all(&buffer[..n]).await {
                Ok(()) => transferred += n as u64,
                Err(e) => {
                    warn!(
                        "{} send error after {} of {} bytes, discarding the rest: {}",
                        direction, transferred, size, e
                    );
                    sink_failed = true;
                }
            }
        }
        remaining -= n as u64;

        if n < chunk {
            warn!("{} stream ended after {} of {} bytes", direction, size - remaining, size);
            break;
        }
    }

    if !sink_failed {
        if let Err(e) = sink.flush().await {
            warn!("{} flush error: {}", direction, e);
        }
    }

    debug!("{} moved {} of {} bytes", direction, transferred, size);
    TransferOutcome {
        expected: size,
        transferred,
    }
}
