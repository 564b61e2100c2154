use crate::core_network::port::DataChannelEndpoint;
use crate::helpers::sanitize_input;
use log::debug;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Lifecycle of one control connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Greeting,
    Authenticating,
    Ready,
    Closed,
}

/// Per-connection state, owned by the task serving that connection.
#[derive(Debug)]
pub struct Session {
    pub peer_addr: SocketAddr,
    pub base_path: PathBuf, // Transfers are confined under this directory
    pub username: Option<String>,
    pub state: SessionState,
    data_endpoint: Option<DataChannelEndpoint>,
}

impl Session {
    pub fn new(peer_addr: SocketAddr, base_path: PathBuf) -> Self {
        Self {
            peer_addr,
            base_path,
            username: None,
            state: SessionState::Greeting,
            data_endpoint: None,
        }
    }

    pub fn transition(&mut self, next: SessionState) {
        debug!("Session {}: {:?} -> {:?}", self.peer_addr, self.state, next);
        self.state = next;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Records the endpoint from the latest PORT, replacing any unused one.
    pub fn set_data_endpoint(&mut self, endpoint: DataChannelEndpoint) {
        self.data_endpoint = Some(endpoint);
    }

    /// Hands the endpoint to exactly one transfer.
    pub fn take_data_endpoint(&mut self) -> Option<DataChannelEndpoint> {
        self.data_endpoint.take()
    }

    pub fn resolve_path(&self, arg: &str) -> PathBuf {
        self.base_path.join(sanitize_input(arg))
    }
}
