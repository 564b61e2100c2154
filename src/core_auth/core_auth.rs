/// One `user:pass` line of the credential file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    username: String,
    password: String,
}

impl PasswdEntry {
    /// Splits on the first `:`; the password may itself contain colons.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (username, password) = line.split_once(':')?;
        if username.is_empty() {
            return None;
        }
        Some(PasswdEntry {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn get_password(&self) -> &str {
        &self.password
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }
}

/// Read-only credential list shared by every session.
///
/// Every line is kept, so a user listed twice may log in with either password.
#[derive(Debug, Default, Clone)]
pub struct CredentialStore {
    entries: Vec<PasswdEntry>,
}

impl CredentialStore {
    pub fn from_contents(content: &str) -> Self {
        let entries = content.lines().filter_map(PasswdEntry::from_line).collect();
        Self { entries }
    }

    /// Exact, case-sensitive match on both fields against any line.
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.get_username() == username && entry.get_password() == password)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
