//! Control-channel framing.
//!
//! Requests travel as `VERB[ PARAM]\r\n`, replies as `CODE TEXT\r\n`.
//! Both ends share this module.

use crate::constants::COMMAND_SIZE;
use crate::core_error::FtpError;
use std::fmt;

/// A reply read off the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMessage {
    pub code: u16,
    pub text: String,
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text)
    }
}

/// A request read off the control channel. `verb` is always upper case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub parameter: Option<String>,
}

impl Command {
    pub fn parameter_or_empty(&self) -> String {
        self.parameter.clone().unwrap_or_default()
    }
}

fn reject_line_breaks(field: &str) -> Result<(), FtpError> {
    if field.contains(['\r', '\n']) {
        return Err(FtpError::InvalidMessage(field.to_string()));
    }
    Ok(())
}

/// Cuts the line at the first CR or LF.
fn strip_terminator(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .position(|b| *b == b'\r' || *b == b'\n')
        .unwrap_or(bytes.len());
    &bytes[..end]
}

/// Formats a request line.
pub fn encode_command(verb: &str, parameter: Option<&str>) -> Result<Vec<u8>, FtpError> {
    if verb.is_empty() {
        return Err(FtpError::InvalidCommand(verb.to_string()));
    }
    reject_line_breaks(verb)?;
    let line = match parameter {
        Some(param) => {
            reject_line_breaks(param)?;
            format!("{} {}\r\n", verb, param)
        }
        None => format!("{}\r\n", verb),
    };
    Ok(line.into_bytes())
}

/// Formats a reply line.
pub fn encode_reply(code: u16, text: &str) -> Result<Vec<u8>, FtpError> {
    reject_line_breaks(text)?;
    Ok(format!("{} {}\r\n", code, text).into_bytes())
}

/// Splits a reply into its status code and free text.
///
/// Zero bytes means the peer hung up. A leading token that is not a
/// three-digit code in `100..=599` is a malformed reply.
pub fn decode_reply(bytes: &[u8]) -> Result<ControlMessage, FtpError> {
    if bytes.is_empty() {
        return Err(FtpError::PeerClosed);
    }
    let line = String::from_utf8_lossy(strip_terminator(bytes)).into_owned();
    let (code, text) = match line.split_once(' ') {
        Some((code, text)) => (code, text),
        None => (line.as_str(), ""),
    };
    let code: u16 = code
        .parse()
        .ok()
        .filter(|c| (100..=599).contains(c))
        .ok_or_else(|| FtpError::MalformedReply(line.clone()))?;

    Ok(ControlMessage {
        code,
        text: text.to_string(),
    })
}

/// Splits a request line on its first space into verb and parameter.
pub fn parse_command(bytes: &[u8]) -> Result<Command, FtpError> {
    if bytes.is_empty() {
        return Err(FtpError::PeerClosed);
    }
    let line = String::from_utf8_lossy(strip_terminator(bytes)).into_owned();
    let (verb, parameter) = match line.split_once(' ') {
        Some((verb, param)) => (verb, Some(param)),
        None => (line.as_str(), None),
    };
    if verb.len() < COMMAND_SIZE {
        return Err(FtpError::InvalidCommand(line.clone()));
    }

    Ok(Command {
        verb: verb.to_ascii_uppercase(),
        parameter: parameter.filter(|p| !p.is_empty()).map(str::to_string),
    })
}
