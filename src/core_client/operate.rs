use crate::core_client::client::FtpClient;
use crate::core_error::FtpError;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite};

/// One line typed at the `Operation:` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Get(String),
    Put(String),
    Quit,
    Empty,
    Usage(&'static str),
    Unknown(String),
}

impl OperatorCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (op, arg) = match line.split_once(' ') {
            Some((op, arg)) => (op, arg.trim()),
            None => (line, ""),
        };
        match (op, arg) {
            ("", _) => OperatorCommand::Empty,
            ("quit", _) => OperatorCommand::Quit,
            ("get", "") => OperatorCommand::Usage("get <file>"),
            ("put", "") => OperatorCommand::Usage("put <file>"),
            ("get", file) => OperatorCommand::Get(file.to_string()),
            ("put", file) => OperatorCommand::Put(file.to_string()),
            (other, _) => OperatorCommand::Unknown(other.to_string()),
        }
    }
}

/// Prompts and reads one line; `None` at end of input.
pub async fn read_input<R>(input: &mut R, prompt: &str) -> Result<Option<String>, FtpError>
where
    R: AsyncBufRead + Unpin,
{
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Full interactive session: greeting, login prompts, then the operation loop.
pub async fn run_interactive<S, R>(client: &mut FtpClient<S>, input: &mut R) -> Result<(), FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    client.expect_greeting().await?;

    let username = read_input(input, "username: ").await?.unwrap_or_default();
    let password = read_input(input, "passwd: ").await?.unwrap_or_default();
    client.login(&username, &password).await?;

    operate(client, input).await
}

/// Runs one operator command to completion before reading the next.
/// End of input behaves like `quit`.
pub async fn operate<S, R>(client: &mut FtpClient<S>, input: &mut R) -> Result<(), FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    loop {
        let Some(line) = read_input(input, "Operation: ").await? else {
            return client.quit().await;
        };

        match OperatorCommand::parse(&line) {
            OperatorCommand::Get(file) => {
                client.get(&file).await?;
            }
            OperatorCommand::Put(file) => {
                client.put(Path::new(&file)).await?;
            }
            OperatorCommand::Quit => return client.quit().await,
            OperatorCommand::Empty => {}
            OperatorCommand::Usage(usage) => println!("usage: {}", usage),
            OperatorCommand::Unknown(op) => println!("unexpected command: {}", op),
        }
    }
}
