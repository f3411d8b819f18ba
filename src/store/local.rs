//! Local fallback backing
//!
//! The whole history is one JSON array under a fixed key, trimmed to the
//! highest scores on every write. Unreadable data counts as empty history.

use uuid::Uuid;

use super::StoreError;
use crate::leaderboard::{ScoreRecord, ScoreSubmission, retain_top};
use crate::persistence::KeyValueStore;

pub struct LocalScores<S> {
    storage: S,
    key: String,
    cap: usize,
}

impl<S: KeyValueStore> LocalScores<S> {
    pub fn new(storage: S, key: impl Into<String>, cap: usize) -> Self {
        Self {
            storage,
            key: key.into(),
            cap,
        }
    }

    /// Full local history, best score first
    pub fn load(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let Some(json) = self.storage.get_item(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&json) {
            Ok(history) => Ok(history),
            Err(e) => {
                log::warn!("Ignoring unreadable local scores ({e})");
                Ok(Vec::new())
            }
        }
    }

    /// Append and trim to the cap. Returns the new record's id.
    pub fn append(&self, submission: ScoreSubmission) -> Result<String, StoreError> {
        let mut history = self.load()?;
        let id = Uuid::new_v4().to_string();
        history.push(ScoreRecord::with_id(id.clone(), submission));
        retain_top(&mut history, self.cap);

        let json = serde_json::to_string(&history)?;
        self.storage.set_item(&self.key, &json)?;
        log::debug!("Local scores saved ({} entries)", history.len());
        Ok(id)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove_item(&self.key)?;
        Ok(())
    }
}
