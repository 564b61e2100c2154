use crate::constants::{EPHEMERAL_PORT_ATTEMPTS, EPHEMERAL_PORT_MAX, EPHEMERAL_PORT_MIN};
use crate::core_error::FtpError;
use crate::core_network::port::DataChannelEndpoint;
use log::{debug, trace};
use rand::Rng;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Listening half of an active-mode data channel, held by the side that
/// issued PORT. Accepts exactly one connection and is then dropped.
pub struct DataListener {
    listener: TcpListener,
    endpoint: DataChannelEndpoint,
}

/// Random candidates from the dynamic range, skipping `previous`.
fn candidate_ports(previous: Option<u16>) -> Vec<u16> {
    let mut rng = rand::thread_rng();
    (0..EPHEMERAL_PORT_ATTEMPTS)
        .map(|_| rng.gen_range(EPHEMERAL_PORT_MIN..=EPHEMERAL_PORT_MAX))
        .filter(|port| Some(*port) != previous)
        .collect()
}

impl DataListener {
    /// Binds a fresh listener on `local_ip`, the address the peer already
    /// reaches us on over the control channel.
    pub async fn open(local_ip: Ipv4Addr, previous: Option<u16>) -> Result<Self, FtpError> {
        for port in candidate_ports(previous) {
            match TcpListener::bind((local_ip, port)).await {
                Ok(listener) => return Self::from_listener(listener),
                Err(e) => trace!("Data port {} unavailable: {}", port, e),
            }
        }

        debug!("No random data port was free, letting the OS choose");
        let listener = TcpListener::bind((local_ip, 0)).await?;
        Self::from_listener(listener)
    }

    fn from_listener(listener: TcpListener) -> Result<Self, FtpError> {
        let endpoint = DataChannelEndpoint::from_socket_addr(listener.local_addr()?)?;
        debug!("Data listener bound on {}", endpoint);
        Ok(Self { listener, endpoint })
    }

    pub fn endpoint(&self) -> DataChannelEndpoint {
        self.endpoint
    }

    /// Waits for the peer's single inbound data connection.
    pub async fn accept(self, timeout: Duration) -> Result<TcpStream, FtpError> {
        match tokio::time::timeout(timeout, self.listener.accept()).await {
            Ok(Ok((stream, addr))) => {
                debug!("Accepted data connection from: {}", addr);
                Ok(stream)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(FtpError::Timeout),
        }
    }
}

/// Connects out to the endpoint a peer advertised with PORT.
pub async fn connect_data_channel(
    endpoint: DataChannelEndpoint,
    timeout: Duration,
) -> Result<TcpStream, FtpError> {
    match tokio::time::timeout(timeout, TcpStream::connect(endpoint.socket_addr())).await {
        Ok(Ok(stream)) => {
            debug!("Data connection established with {}", endpoint);
            Ok(stream)
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(FtpError::Timeout),
    }
}
