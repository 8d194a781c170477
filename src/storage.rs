//! Sled-based storage for per-user and per-channel language preferences.

use crate::config::is_valid_lang;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    DbError(#[from] sled::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("invalid language code: {0:?}")]
    InvalidLang(String),
}

/// Who a preference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Nick(&'a str),
    Channel(&'a str),
}

impl Scope<'_> {
    /// Keys are case-insensitive, like nicks and channel names on IRC.
    fn key(&self) -> String {
        match self {
            Scope::Nick(nick) => format!("nick:{}", nick.to_lowercase()),
            Scope::Channel(channel) => format!("channel:{}", channel.to_lowercase()),
        }
    }
}

/// A stored language preference with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLang {
    pub lang: String,
    /// When the preference was last set
    pub set_at: DateTime<Utc>,
}

/// Language preference store.
pub struct LangStore {
    db: sled::Db,
}

impl LangStore {
    /// Open or create storage at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Set the language for a nick or channel
    pub fn set(&self, scope: Scope<'_>, lang: &str) -> Result<(), StorageError> {
        if !is_valid_lang(lang) {
            return Err(StorageError::InvalidLang(lang.to_string()));
        }
        let stored = StoredLang {
            lang: lang.to_string(),
            set_at: Utc::now(),
        };
        let value = serde_json::to_vec(&stored)?;
        self.db.insert(scope.key().as_bytes(), value)?;
        self.db.flush()?;
        debug!(key = %scope.key(), lang, "stored language preference");
        Ok(())
    }

    /// Retrieve the stored preference for a nick or channel
    pub fn get(&self, scope: Scope<'_>) -> Result<Option<StoredLang>, StorageError> {
        match self.db.get(scope.key().as_bytes())? {
            Some(data) => {
                let stored: StoredLang = serde_json::from_slice(&data)?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    /// Pick the language for a lookup: the nick's preference, else the
    /// channel's (only when the message came from a channel), else `default`.
    pub fn choose_lang(
        &self,
        nick: Option<&str>,
        channel: Option<&str>,
        default: &str,
    ) -> Result<String, StorageError> {
        if let Some(nick) = nick {
            if let Some(stored) = self.get(Scope::Nick(nick))? {
                return Ok(stored.lang);
            }
        }
        if let Some(channel) = channel.filter(|c| is_channel(c)) {
            if let Some(stored) = self.get(Scope::Channel(channel))? {
                return Ok(stored.lang);
            }
        }
        Ok(default.to_string())
    }
}

/// IRC channel names start with `#` or `&`.
pub fn is_channel(target: &str) -> bool {
    target.starts_with(['#', '&'])
}
