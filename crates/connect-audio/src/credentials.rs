//! Credential persistence for SDK logins.
//!
//! The SDK hands back an opaque reusable credential blob after login; the
//! store rewrites the JSON record wholesale and synchronously so the next
//! start can log in without a password.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk credentials record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

pub struct CredentialsStore {
    path: PathBuf,
    record: Credentials,
}

impl CredentialsStore {
    /// Open a store at `path`, loading any existing record.
    ///
    /// A missing or unreadable file yields an empty record; the file itself
    /// is only written on [`CredentialsStore::update_blob`].
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                tracing::warn!(
                    path = %path.display(),
                    "ignoring unparsable credentials file: {err}"
                );
                Credentials::default()
            }),
            Err(_) => Credentials::default(),
        };
        Self { path, record }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self) -> &Credentials {
        &self.record
    }

    /// Store a new credential blob and rewrite the file synchronously.
    pub fn update_blob(&mut self, blob: &str) -> Result<()> {
        self.record.blob = Some(blob.to_string());
        let json = serde_json::to_string(&self.record).context("serialize credentials")?;
        fs::write(&self.path, json)
            .with_context(|| format!("write credentials {}", self.path.display()))?;
        Ok(())
    }
}
