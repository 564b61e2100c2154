use crate::core_auth::core_auth::CredentialStore;
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Loads the credential file once at start-up.
///
/// An unreadable file leaves the store empty, so every login is refused.
pub fn load_credentials(path: &Path) -> CredentialStore {
    match fs::read_to_string(path) {
        Ok(content) => {
            let store = CredentialStore::from_contents(&content);
            info!("Loaded {} credential(s) from {}", store.len(), path.display());
            store
        }
        Err(e) => {
            warn!("Error opening {}: {}; all logins will be refused", path.display(), e);
            CredentialStore::default()
        }
    }
}
