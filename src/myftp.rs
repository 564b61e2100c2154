use anyhow::{Context, Result};
use clap::Parser;
use srvftp::core_cli::ClientCli;
use srvftp::core_client::{run_interactive, FtpClient};
use srvftp::core_log::logger::init_logger;
use srvftp::Config;
use std::net::SocketAddrV4;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientCli::parse();

    init_logger(args.verbose, "warn");

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.download_dir {
        config.client.download_dir = dir;
    }

    let addr = SocketAddrV4::new(args.server_ip, args.server_port);
    let mut client = FtpClient::connect(addr, config.client)
        .await
        .with_context(|| format!("connect failed: {}", addr))?;

    let mut input = BufReader::new(tokio::io::stdin());
    run_interactive(&mut client, &mut input).await?;

    Ok(())
}
