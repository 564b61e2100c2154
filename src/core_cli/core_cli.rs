use crate::constants::IPV4_REGEX;
use clap::Parser;
use regex::Regex;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Command-line arguments of the server
#[derive(Parser, Debug)]
#[command(name = "srvftp", about = "An active-mode FTP server written in Rust.")]
pub struct ServerCli {
    /// Port to listen on
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Credential file of `user:pass` lines
    #[arg(short, long)]
    pub users: Option<PathBuf>,

    /// Directory served to clients
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command-line arguments of the interactive client
#[derive(Parser, Debug)]
#[command(name = "myftp", about = "Interactive client for srvftp.")]
pub struct ClientCli {
    /// Server IPv4 address
    #[arg(value_parser = parse_ipv4)]
    pub server_ip: Ipv4Addr,

    /// Server control port
    #[arg(value_parser = parse_port)]
    pub server_port: u16,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where downloaded files are written
    #[arg(short, long)]
    pub download_dir: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

/// Accepts exactly four dot-separated decimal octets, each in 0-255.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr, String> {
    let re = Regex::new(IPV4_REGEX).map_err(|e| e.to_string())?;
    let caps = re
        .captures(s)
        .ok_or_else(|| format!("Invalid IP: {}", s))?;

    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = caps[i + 1]
            .parse()
            .map_err(|_| format!("Invalid IP: octet {} out of range", &caps[i + 1]))?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// Accepts a purely numeric port in 0-65535.
pub fn parse_port(s: &str) -> Result<u16, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Invalid Port: {}", s));
    }
    s.parse()
        .map_err(|_| format!("Invalid Port: {} is out of range", s))
}
