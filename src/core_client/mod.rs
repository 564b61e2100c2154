pub mod client;
pub mod operate;

pub use client::FtpClient;
pub use operate::{run_interactive, OperatorCommand};

#[cfg(test)]
mod test_client;
