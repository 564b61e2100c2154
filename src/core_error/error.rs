use std::net::SocketAddr;
use thiserror::Error;

/// Errors raised by the control and data channels.
#[derive(Error, Debug)]
pub enum FtpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    PeerClosed,

    #[error("data channel timed out")]
    Timeout,

    #[error("address {0} cannot be advertised with PORT")]
    UnsupportedAddress(SocketAddr),

    #[error("message exceeds {0} bytes")]
    MessageTooLong(usize),

    #[error("malformed reply: {0:?}")]
    MalformedReply(String),

    #[error("message contains a line terminator: {0:?}")]
    InvalidMessage(String),

    #[error("not a valid ftp command: {0:?}")]
    InvalidCommand(String),

    #[error("abnormal client flow: expected {expected}, received {received}")]
    UnexpectedCommand { expected: String, received: String },

    #[error("unexpected response from server: expected {expected}, received {received} {text}")]
    UnexpectedReply {
        expected: u16,
        received: u16,
        text: String,
    },

    #[error("invalid PORT specification: {0:?}")]
    InvalidPortSpec(String),

    #[error("invalid STOR parameter: {0:?}")]
    InvalidStorParameter(String),
}

impl FtpError {
    /// True when the peer broke the protocol, as opposed to the transport failing.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            FtpError::MessageTooLong(_)
                | FtpError::MalformedReply(_)
                | FtpError::InvalidCommand(_)
                | FtpError::UnexpectedCommand { .. }
                | FtpError::UnexpectedReply { .. }
                | FtpError::InvalidPortSpec(_)
                | FtpError::InvalidStorParameter(_)
        )
    }
}
