use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Session state tracked by the token store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: Option<String>,
    pub username: String,
    pub token_expiry: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.token_expiry
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.token_expiry - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }
}

/// Holds the current token, username and expiry.
///
/// `token` being `None` means unauthenticated. A store created with
/// [`TokenDataStore::persistent`] writes every change through to
/// `session.json`; clearing the token removes the file.
#[derive(Debug, Default)]
pub struct TokenDataStore {
    path: Option<PathBuf>,
    data: SessionData,
}

impl TokenDataStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn persistent(cache_dir: PathBuf) -> Self {
        Self {
            path: Some(cache_dir.join(SESSION_FILE)),
            data: SessionData::default(),
        }
    }

    /// Load session from disk. Returns whether a session file was found.
    pub fn load(&mut self) -> Result<bool> {
        let Some(path) = self.path.as_ref() else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        self.data = serde_json::from_str(&contents).context("Failed to parse session file")?;
        debug!(username = %self.data.username, "Session loaded");
        Ok(true)
    }

    pub fn token(&self) -> Option<&str> {
        self.data.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.data.token = token;
        self.persist();
    }

    pub fn username(&self) -> &str {
        &self.data.username
    }

    pub fn set_username(&mut self, username: String) {
        self.data.username = username;
        self.persist();
    }

    pub fn token_expiry(&self) -> DateTime<Utc> {
        self.data.token_expiry
    }

    pub fn set_token_expiry(&mut self, expiry: DateTime<Utc>) {
        self.data.token_expiry = expiry;
        self.persist();
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Liveness probe: a token is present and has not expired.
    pub fn check(&self) -> bool {
        self.data.token.is_some() && !self.data.is_expired()
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist session");
        }
    }

    /// Write the session to disk, or remove the file when there is no token.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };

        if self.data.token.is_none() {
            if path.exists() {
                std::fs::remove_file(path).context("Failed to remove session file")?;
            }
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
