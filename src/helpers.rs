use crate::Config;
use log::info;
use std::path::{Component, Path, PathBuf};

/// Sanitizes input to prevent directory traversal attacks and ensure paths are relative.
pub fn sanitize_input(input: &str) -> PathBuf {
    Path::new(input)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Last path component of a remote name, used as the local file name.
pub fn local_file_name(remote: &str) -> Option<String> {
    Path::new(remote)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Users File: {}", config.server.users_file.display());
    info!("  Root Directory: {}", config.server.root_dir.display());
    info!("  Block Size: {} bytes", config.server.block_size());
    info!("  Data Channel Timeout: {} s", config.server.data_timeout_secs);
}
