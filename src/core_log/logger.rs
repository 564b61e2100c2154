use chrono::Local;
use colored::*;
use env_logger::{Builder, Env};
use std::io::Write;

/// Initializes the global logger.
///
/// `RUST_LOG` wins over `default_level`; `verbose` lowers the default to `debug`.
pub fn init_logger(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };

    Builder::from_env(Env::default().default_filter_or(level))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red(),
                log::Level::Warn => record.level().to_string().yellow(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().white(),
            };
            writeln!(buf, "[{}] [{}] {}", timestamp, level, record.args())
        })
        .init();
}
