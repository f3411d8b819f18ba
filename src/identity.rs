//! Player identity and device identifier
//!
//! Neither is authenticated. The display name is what the leaderboard groups
//! by; the device id only decides whether a name that is already on the board
//! may be reused.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{USERNAME_MAX_LEN, USERNAME_MIN_LEN};
use crate::persistence::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("username must be at least {min} characters long")]
    TooShort { min: usize },

    #[error("username must be at most {max} characters long")]
    TooLong { max: usize },
}

/// A validated display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Trim and check length (in characters)
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let name = raw.trim();
        let len = name.chars().count();
        if len < USERNAME_MIN_LEN {
            return Err(IdentityError::TooShort {
                min: USERNAME_MIN_LEN,
            });
        }
        if len > USERNAME_MAX_LEN {
            return Err(IdentityError::TooLong {
                max: USERNAME_MAX_LEN,
            });
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque per-browser token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse the id stored under `key`, or create and store a new one.
    ///
    /// Storage failures fall back to an id that lives for this session only.
    pub fn load_or_create(storage: &impl KeyValueStore, key: &str) -> Self {
        match storage.get_item(key) {
            Ok(Some(token)) if !token.trim().is_empty() => return Self(token.trim().to_string()),
            Ok(_) => {}
            Err(e) => {
                log::warn!("Device id unreadable ({e}), using a session-only id");
                return Self::generate();
            }
        }

        let id = Self::generate();
        match storage.set_item(key, id.as_str()) {
            Ok(()) => log::info!("Created device id"),
            Err(e) => log::warn!("Device id not persisted: {e}"),
        }
        id
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
