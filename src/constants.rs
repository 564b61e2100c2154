// src/constants.rs

/// Upper bound for one control-channel message, terminator included.
pub const MAX_MESSAGE_SIZE: usize = 512;
/// Default block size of the transfer loop.
pub const DEFAULT_BUFFER_SIZE: usize = 512;
/// Every verb is exactly this long on the wire.
pub const COMMAND_SIZE: usize = 4;
/// Joins file name and declared size in the STOR parameter.
pub const STOR_DELIMITER: &str = "//";

pub const DEFAULT_DATA_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USERS_FILE: &str = "./ftpusers";
pub const DEFAULT_LISTEN_PORT: u16 = 2121;

/// Dynamic/private port range used for active-mode data listeners.
pub const EPHEMERAL_PORT_MIN: u16 = 49152;
pub const EPHEMERAL_PORT_MAX: u16 = 65535;
pub const EPHEMERAL_PORT_ATTEMPTS: usize = 16;

pub const SERVER_BANNER: &str = "srvFtp version 1.0";

/// Four dot-separated decimal octets; the 0-255 range is checked after matching.
pub const IPV4_REGEX: &str = r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$";

// Reply codes
pub const CODE_OPENING_DATA: u16 = 150;
pub const CODE_PORT_OK: u16 = 200;
pub const CODE_GREETING: u16 = 220;
pub const CODE_GOODBYE: u16 = 221;
pub const CODE_TRANSFER_COMPLETE: u16 = 226;
pub const CODE_LOGGED_IN: u16 = 230;
pub const CODE_FILE_SIZE: u16 = 299;
pub const CODE_NEED_PASSWORD: u16 = 331;
pub const CODE_CANT_OPEN_DATA: u16 = 425;
pub const CODE_LOCAL_ERROR: u16 = 451;
pub const CODE_SYNTAX_ERROR: u16 = 501;
pub const CODE_BAD_SEQUENCE: u16 = 503;
pub const CODE_NOT_IMPLEMENTED: u16 = 502;
pub const CODE_LOGIN_INCORRECT: u16 = 530;
pub const CODE_FILE_UNAVAILABLE: u16 = 550;
