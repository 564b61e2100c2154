//! Client half of the protocol: greeting, login, RETR/STOR over an
//! active-mode data channel, QUIT. Every reply is echoed to stdout.

use crate::config::ClientConfig;
use crate::constants::{
    CODE_FILE_SIZE, CODE_GOODBYE, CODE_GREETING, CODE_LOGGED_IN, CODE_NEED_PASSWORD,
    CODE_OPENING_DATA, CODE_PORT_OK, CODE_TRANSFER_COMPLETE,
};
use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::message::ControlMessage;
use crate::core_ftpcommand::retr::parse_size_announcement;
use crate::core_ftpcommand::stor::encode_stor_parameter;
use crate::core_network::control::ControlChannel;
use crate::core_network::data_channel::DataListener;
use crate::core_network::port::DataChannelEndpoint;
use crate::core_transfer::{transfer_exact, TransferDirection, TransferOutcome};
use crate::helpers::local_file_name;
use log::{debug, info, warn};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

pub struct FtpClient<S> {
    control: ControlChannel<S>,
    local_ip: Ipv4Addr,
    config: ClientConfig,
    last_data_port: Option<u16>,
}

impl FtpClient<TcpStream> {
    /// Opens the control connection. Data listeners later bind to the
    /// local address this connection was given.
    pub async fn connect(addr: SocketAddrV4, config: ClientConfig) -> Result<Self, FtpError> {
        let stream = TcpStream::connect(addr).await?;
        let local_ip = DataChannelEndpoint::from_socket_addr(stream.local_addr()?)?.address;
        debug!("Control connection to {} from {}", addr, local_ip);
        Ok(Self::new(stream, local_ip, config))
    }
}

impl<S> FtpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, local_ip: Ipv4Addr, config: ClientConfig) -> Self {
        Self {
            control: ControlChannel::new(stream),
            local_ip,
            config,
            last_data_port: None,
        }
    }

    pub fn last_data_port(&self) -> Option<u16> {
        self.last_data_port
    }

    async fn recv_reply(&mut self) -> Result<ControlMessage, FtpError> {
        let reply = self.control.read_reply().await?;
        println!("{}", reply);
        Ok(reply)
    }

    async fn expect_reply(&mut self, code: u16) -> Result<ControlMessage, FtpError> {
        let reply = self.recv_reply().await?;
        if reply.code != code {
            return Err(FtpError::UnexpectedReply {
                expected: code,
                received: reply.code,
                text: reply.text,
            });
        }
        Ok(reply)
    }

    pub async fn expect_greeting(&mut self) -> Result<(), FtpError> {
        self.expect_reply(CODE_GREETING).await.map(|_| ())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), FtpError> {
        self.control
            .send_command(FtpCommand::USER.as_str(), Some(username))
            .await?;
        self.expect_reply(CODE_NEED_PASSWORD).await?;

        self.control
            .send_command(FtpCommand::PASS.as_str(), Some(password))
            .await?;
        self.expect_reply(CODE_LOGGED_IN).await?;
        Ok(())
    }

    /// Binds a fresh listener and advertises it with PORT.
    ///
    /// A reply other than 200 abandons the negotiation and yields `None`;
    /// the listener is dropped without ever accepting.
    async fn open_data_channel(&mut self) -> Result<Option<DataListener>, FtpError> {
        let listener = DataListener::open(self.local_ip, self.last_data_port).await?;
        let endpoint = listener.endpoint();
        self.last_data_port = Some(endpoint.port);

        self.control
            .send_command(FtpCommand::PORT.as_str(), Some(&endpoint.to_port_argument()))
            .await?;
        let reply = self.recv_reply().await?;
        if reply.code != CODE_PORT_OK {
            warn!("PORT refused with {}", reply.code);
            return Ok(None);
        }
        Ok(Some(listener))
    }

    /// Reads the reply that closes a transfer, complete or not.
    async fn finish_transfer(&mut self, verb: FtpCommand) -> Result<(), FtpError> {
        let reply = self.recv_reply().await?;
        if reply.code != CODE_TRANSFER_COMPLETE {
            warn!("Abnormally {} terminated", verb);
        }
        Ok(())
    }

    /// Downloads `remote` into the download directory.
    ///
    /// Returns `None` when the transfer is refused or abandoned (550, a
    /// refused PORT, an unreadable size, no data connection). Only control
    /// channel failures are errors.
    pub async fn get(&mut self, remote: &str) -> Result<Option<TransferOutcome>, FtpError> {
        let Some(file_name) = local_file_name(remote) else {
            println!("{}: not a file name", remote);
            return Ok(None);
        };

        let Some(listener) = self.open_data_channel().await? else {
            return Ok(None);
        };
        self.control
            .send_command(FtpCommand::RETR.as_str(), Some(remote))
            .await?;

        let reply = self.recv_reply().await?;
        if reply.code != CODE_FILE_SIZE {
            return Ok(None);
        }

        let mut data = match listener.accept(self.config.data_timeout()).await {
            Ok(data) => data,
            Err(e) => {
                println!("{}: no data connection ({})", remote, e);
                self.finish_transfer(FtpCommand::RETR).await?;
                return Ok(None);
            }
        };

        let size = match parse_size_announcement(&reply.text) {
            Ok(size) => size,
            Err(e) => {
                // Length unknown: swallow whatever the server sends.
                println!("{}: transfer aborted ({})", remote, e);
                if let Err(e) = tokio::io::copy(&mut data, &mut tokio::io::sink()).await {
                    debug!("discarding RETR data: {}", e);
                }
                drop(data);
                self.finish_transfer(FtpCommand::RETR).await?;
                return Ok(None);
            }
        };

        let block_size = self.config.block_size();
        let local_path = self.config.download_dir.join(file_name);

        // The announced bytes are drained even when the local file cannot
        // be written, so the control channel stays in step.
        let outcome = match File::create(&local_path).await {
            Ok(mut file) => {
                transfer_exact(TransferDirection::Download, &mut data, &mut file, size, block_size)
                    .await
            }
            Err(e) => {
                warn!("Cannot create {}: {}", local_path.display(), e);
                let mut discard = tokio::io::sink();
                transfer_exact(TransferDirection::Download, &mut data, &mut discard, size, block_size)
                    .await
            }
        };
        drop(data);

        self.finish_transfer(FtpCommand::RETR).await?;
        info!("Downloaded {} ({} of {} bytes)", remote, outcome.transferred, outcome.expected);
        Ok(Some(outcome))
    }

    /// Uploads a local file under its base name.
    ///
    /// Returns `None` when the local file is missing, the server refuses,
    /// or the data connection never arrives.
    pub async fn put(&mut self, local: &Path) -> Result<Option<TransferOutcome>, FtpError> {
        let (mut file, size) = match File::open(local).await {
            Ok(file) => {
                let size = file.metadata().await?.len();
                (file, size)
            }
            Err(e) => {
                println!("{}: file does not exist", local.display());
                debug!("open {}: {}", local.display(), e);
                return Ok(None);
            }
        };
        let Some(remote_name) = local.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            println!("{}: not a file name", local.display());
            return Ok(None);
        };

        let Some(listener) = self.open_data_channel().await? else {
            return Ok(None);
        };
        self.control
            .send_command(
                FtpCommand::STOR.as_str(),
                Some(&encode_stor_parameter(&remote_name, size)),
            )
            .await?;

        let reply = self.recv_reply().await?;
        if reply.code != CODE_OPENING_DATA {
            return Ok(None);
        }

        let mut data = match listener.accept(self.config.data_timeout()).await {
            Ok(data) => data,
            Err(e) => {
                println!("{}: no data connection ({})", local.display(), e);
                self.finish_transfer(FtpCommand::STOR).await?;
                return Ok(None);
            }
        };
        let outcome = transfer_exact(
            TransferDirection::Upload,
            &mut file,
            &mut data,
            size,
            self.config.block_size(),
        )
        .await;
        if let Err(e) = data.shutdown().await {
            warn!("Error sending data: {}", e);
        }
        drop(data);

        self.finish_transfer(FtpCommand::STOR).await?;
        info!("Uploaded {} ({} of {} bytes)", local.display(), outcome.transferred, outcome.expected);
        Ok(Some(outcome))
    }

    pub async fn quit(&mut self) -> Result<(), FtpError> {
        self.control
            .send_command(FtpCommand::QUIT.as_str(), None)
            .await?;
        self.expect_reply(CODE_GOODBYE).await?;
        if let Err(e) = self.control.shutdown().await {
            debug!("Control shutdown: {}", e);
        }
        Ok(())
    }
}
