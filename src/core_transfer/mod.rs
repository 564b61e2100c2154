pub mod transfer;

pub use transfer::{transfer_exact, TransferDirection, TransferOutcome};
