// Here's the list of the FTP commands implemented
pub mod pass;
pub mod quit;
pub mod retr;
pub mod stor;
pub mod user;

// Framing, verb table and dispatch
pub mod ftpcommand;
pub mod handlers;
pub mod message;
