use crate::constants::MAX_MESSAGE_SIZE;
use crate::core_error::FtpError;
use crate::core_ftpcommand::message::{
    decode_reply, encode_command, encode_reply, parse_command, Command, ControlMessage,
};
use log::trace;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// The long-lived command/response connection.
///
/// Reads are framed on `\n` and capped at [`MAX_MESSAGE_SIZE`], so each
/// call yields exactly one message no matter how the bytes arrive.
pub struct ControlChannel<S> {
    stream: BufReader<S>,
}

impl<S> ControlChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Reads one raw line, terminator included.
    pub async fn read_line(&mut self) -> Result<Vec<u8>, FtpError> {
        let mut line = Vec::with_capacity(MAX_MESSAGE_SIZE);
        let n = (&mut self.stream)
            .take(MAX_MESSAGE_SIZE as u64)
            .read_until(b'\n', &mut line)
            .await?;

        if n == 0 {
            return Err(FtpError::PeerClosed);
        }
        if n == MAX_MESSAGE_SIZE && !line.ends_with(b"\n") {
            return Err(FtpError::MessageTooLong(MAX_MESSAGE_SIZE));
        }
        trace!("control <- {:?}", String::from_utf8_lossy(&line));
        Ok(line)
    }

    pub async fn send_raw(&mut self, message: &[u8]) -> Result<(), FtpError> {
        trace!("control -> {:?}", String::from_utf8_lossy(message));
        let writer = self.stream.get_mut();
        writer.write_all(message).await?;
        writer.flush().await?;
        Ok(())
    }

    pub async fn send_reply(&mut self, code: u16, text: &str) -> Result<(), FtpError> {
        let message = encode_reply(code, text)?;
        self.send_raw(&message).await
    }

    pub async fn send_command(
        &mut self,
        verb: &str,
        parameter: Option<&str>,
    ) -> Result<(), FtpError> {
        let message = encode_command(verb, parameter)?;
        self.send_raw(&message).await
    }

    pub async fn read_reply(&mut self) -> Result<ControlMessage, FtpError> {
        let line = self.read_line().await?;
        decode_reply(&line)
    }

    pub async fn read_request(&mut self) -> Result<Command, FtpError> {
        let line = self.read_line().await?;
        parse_command(&line)
    }

    pub async fn shutdown(&mut self) -> Result<(), FtpError> {
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }
}
