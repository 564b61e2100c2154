//! Active-mode endpoint encoding for the `PORT` command.
//!
//! `PORT h1,h2,h3,h4,p1,p2` carries the IPv4 octets in order followed by
//! the port split big-endian into two decimal fields.

use crate::constants::CODE_PORT_OK;
use crate::core_error::FtpError;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_network::control::ControlChannel;
use crate::session::Session;
use log::info;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::io::{AsyncRead, AsyncWrite};

/// Where the requester listens for one data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataChannelEndpoint {
    pub address: Ipv4Addr,
    pub port: u16,
}

pub fn split_port(port: u16) -> (u8, u8) {
    ((port / 256) as u8, (port % 256) as u8)
}

pub fn join_port(p1: u8, p2: u8) -> u16 {
    256 * p1 as u16 + p2 as u16
}

impl DataChannelEndpoint {
    pub fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    /// Only IPv4 (or IPv4-mapped IPv6) addresses fit in a PORT argument.
    pub fn from_socket_addr(addr: SocketAddr) -> Result<Self, FtpError> {
        let address = match addr.ip() {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(ip) => ip
                .to_ipv4_mapped()
                .ok_or(FtpError::UnsupportedAddress(addr))?,
        };
        Ok(Self::new(address, addr.port()))
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }

    pub fn to_port_argument(&self) -> String {
        let [h1, h2, h3, h4] = self.address.octets();
        let (p1, p2) = split_port(self.port);
        format!("{},{},{},{},{},{}", h1, h2, h3, h4, p1, p2)
    }

    pub fn parse_port_argument(arg: &str) -> Result<Self, FtpError> {
        let fields: Vec<&str> = arg.trim().split(',').collect();
        if fields.len() != 6 {
            return Err(FtpError::InvalidPortSpec(arg.to_string()));
        }
        let mut octets = [0u8; 6];
        for (slot, field) in octets.iter_mut().zip(&fields) {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(FtpError::InvalidPortSpec(arg.to_string()));
            }
            *slot = field
                .parse()
                .map_err(|_| FtpError::InvalidPortSpec(arg.to_string()))?;
        }

        Ok(Self::new(
            Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]),
            join_port(octets[4], octets[5]),
        ))
    }
}

impl fmt::Display for DataChannelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records the endpoint; the outbound connection is made by the
/// transfer command that consumes it.
pub async fn handle_port_command<S>(
    control: &mut ControlChannel<S>,
    session: &mut Session,
    arg: String,
) -> Result<CommandOutcome, FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let endpoint = DataChannelEndpoint::parse_port_argument(&arg)?;
    info!("Received PORT command from {}: data endpoint {}", session.peer_addr, endpoint);

    session.set_data_endpoint(endpoint);
    control.send_reply(CODE_PORT_OK, "PORT command successful").await?;
    Ok(CommandOutcome::Continue)
}
