//! Game settings
//!
//! Persisted as JSON in the key-value store, separate from the score history.
//! Missing or unreadable settings fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEVICE_ID_STORAGE_KEY, LEADERBOARD_SIZE, LOCAL_HISTORY_CAP, SCORES_STORAGE_KEY,
    SETTINGS_STORAGE_KEY,
};
use crate::persistence::{KeyValueStore, StorageError};
use crate::tuning::RunConfig;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run physics and obstacle catalogue
    pub run: RunConfig,

    // === Leaderboard ===
    /// Rows shown on the game-over board
    pub leaderboard_size: usize,
    /// Records kept by the local fallback store
    pub local_history_cap: usize,
    /// Remote database root; `None` plays against local scores only
    pub database_url: Option<String>,

    // === Storage keys ===
    pub scores_key: String,
    pub device_id_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),

            leaderboard_size: LEADERBOARD_SIZE,
            local_history_cap: LOCAL_HISTORY_CAP,
            database_url: None,

            scores_key: SCORES_STORAGE_KEY.to_string(),
            device_id_key: DEVICE_ID_STORAGE_KEY.to_string(),
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = SETTINGS_STORAGE_KEY;

    /// Load settings from storage
    pub fn load(storage: &impl KeyValueStore) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Self>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring unreadable settings ({e})"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable ({e})"),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to storage
    pub fn save(&self, storage: &impl KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self).map_err(|e| StorageError::Io {
            key: Self::STORAGE_KEY.to_string(),
            reason: e.to_string(),
        })?;
        storage.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Apply `RUNNER_*` environment overrides (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("RUNNER_DATABASE_URL") {
            self.database_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(size) = std::env::var("RUNNER_LEADERBOARD_SIZE")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.leaderboard_size = size;
        }
        self.sanitized()
    }

    /// Replace unusable values with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.run = self.run.sanitized();
        if self.leaderboard_size == 0 {
            self.leaderboard_size = defaults.leaderboard_size;
        }
        if self.local_history_cap == 0 {
            self.local_history_cap = defaults.local_history_cap;
        }
        if self.scores_key.is_empty() {
            self.scores_key = defaults.scores_key;
        }
        if self.device_id_key.is_empty() {
            self.device_id_key = defaults.device_id_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.leaderboard_size, 10);
        assert_eq!(settings.local_history_cap, 100);
        assert_eq!(settings.scores_key, "endlessRunnerScores");
        assert_eq!(settings.device_id_key, "endlessRunnerBrowserId");
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::new();
        let settings = Settings {
            leaderboard_size: 5,
            database_url: Some("https://runner.example".to_string()),
            ..Settings::default()
        };
        settings.save(&storage).unwrap();
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let storage = MemoryStorage::new();
        storage
            .set_item(SETTINGS_STORAGE_KEY, r#"{"leaderboardSize": 3}"#)
            .unwrap();
        // Unknown casing is ignored, everything else defaults
        assert_eq!(Settings::load(&storage), Settings::default());

        storage
            .set_item(SETTINGS_STORAGE_KEY, r#"{"leaderboard_size": 3}"#)
            .unwrap();
        assert_eq!(Settings::load(&storage).leaderboard_size, 3);
    }

    #[test]
    fn test_corrupt_or_unavailable_is_default() {
        let storage = MemoryStorage::new();
        storage.set_item(SETTINGS_STORAGE_KEY, "not json").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());

        storage.set_offline(true);
        assert_eq!(Settings::load(&storage), Settings::default());
        assert!(Settings::default().save(&storage).is_err());
    }

    #[test]
    fn test_sanitized_restores_zero_sizes() {
        let settings = Settings {
            leaderboard_size: 0,
            local_history_cap: 0,
            scores_key: String::new(),
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(settings, Settings::default());
    }
}
