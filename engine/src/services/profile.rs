//! Read-only access to the persisted farmer profile
//!
//! The profile lives under a single key of a JSON key/value record. The value
//! may be the profile object itself or that object serialized to a string.
//! A missing or unreadable profile is not an error: every field falls back
//! to the defaults table downstream.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use shared::UserProfile;
use tracing::{debug, warn};

use crate::config::ProfileConfig;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self) -> UserProfile;
}

/// Profile record stored as a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileProfileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileProfileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn from_config(config: &ProfileConfig) -> Self {
        Self::new(&config.path, &config.key)
    }

    async fn read(&self) -> AppResult<Option<UserProfile>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::ProfileStore(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let record: Value = serde_json::from_str(&contents)?;
        parse_profile_entry(record.get(&self.key))
    }
}

/// Decode the stored value, unwrapping a string-encoded profile
pub fn parse_profile_entry(entry: Option<&Value>) -> AppResult<Option<UserProfile>> {
    match entry {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(encoded)) => Ok(Some(serde_json::from_str(encoded)?)),
        Some(value @ Value::Object(_)) => Ok(Some(UserProfile::deserialize(value)?)),
        Some(other) => Err(AppError::ProfileStore(format!(
            "Unexpected profile value: {}",
            other
        ))),
    }
}

#[async_trait]
impl ProfileStore for JsonFileProfileStore {
    async fn load(&self) -> UserProfile {
        match self.read().await {
            Ok(Some(profile)) => {
                debug!(path = %self.path.display(), "Loaded farmer profile");
                profile
            }
            Ok(None) => {
                debug!(path = %self.path.display(), key = %self.key, "No farmer profile stored");
                UserProfile::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable farmer profile");
                UserProfile::default()
            }
        }
    }
}

/// Fixed in-memory profile, for embedding applications and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profile: UserProfile,
}

impl InMemoryProfileStore {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self) -> UserProfile {
        self.profile.clone()
    }
}
