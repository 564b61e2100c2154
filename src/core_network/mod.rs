pub mod control;
pub mod data_channel;
pub mod network;
pub mod port;

#[cfg(test)]
mod test_session;
