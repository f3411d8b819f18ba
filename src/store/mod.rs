//! Score store
//!
//! One façade over two backings: a remote log (preferred) and a local
//! key-value fallback. The backing is chosen once, in [`ScoreStore::connect`];
//! a remote that fails to connect is never retried.
//!
//! Backings report typed errors. The façade logs them and degrades to a
//! default (`false`, empty board, `None` rank) so gameplay never stops on a
//! storage problem.

pub mod firebase;
pub mod local;
pub mod remote;

#[cfg(target_arch = "wasm32")]
pub use firebase::FirebaseRemote;
pub use local::LocalScores;
pub use remote::{MemoryRemote, NoRemote, RemoteLog};

use crate::identity::{DeviceId, Identity};
use crate::leaderboard::{self, ScoreRecord, ScoreSubmission};
use crate::persistence::{KeyValueStore, StorageError};
use crate::platform::now_millis;
use crate::settings::Settings;

/// Score backing failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("score data could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote store not reachable
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// Remote store reachable but the request failed
    #[error("remote request failed: {0}")]
    Request(String),
}

enum Backing<R, S> {
    Remote(R),
    Local(LocalScores<S>),
}

pub struct ScoreStore<R, S> {
    backing: Backing<R, S>,
}

impl<S: KeyValueStore> ScoreStore<NoRemote, S> {
    pub fn local_only(storage: S, settings: &Settings) -> Self {
        log::info!("Leaderboard using local scores");
        Self {
            backing: Backing::Local(LocalScores::new(
                storage,
                settings.scores_key.clone(),
                settings.local_history_cap,
            )),
        }
    }
}

impl<R: RemoteLog, S: KeyValueStore> ScoreStore<R, S> {
    /// Pick the backing for the rest of the process
    pub async fn connect(remote: Option<R>, storage: S, settings: &Settings) -> Self {
        let local = LocalScores::new(
            storage,
            settings.scores_key.clone(),
            settings.local_history_cap,
        );

        let backing = match remote {
            Some(remote) => match remote.connect().await {
                Ok(()) => {
                    log::info!("Leaderboard using remote store");
                    Backing::Remote(remote)
                }
                Err(e) => {
                    log::warn!("Remote leaderboard unavailable ({e}), using local scores");
                    Backing::Local(local)
                }
            },
            None => {
                log::info!("Leaderboard using local scores");
                Backing::Local(local)
            }
        };

        Self { backing }
    }

    async fn history(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        match &self.backing {
            Backing::Remote(remote) => remote.fetch_all().await,
            Backing::Local(local) => local.load(),
        }
    }

    /// Append a score stamped with the current time
    pub async fn submit(
        &self,
        identity: &Identity,
        score: u64,
        distance: f64,
        device_id: &DeviceId,
    ) -> bool {
        self.submit_at(identity, score, distance, device_id, now_millis())
            .await
    }

    /// Append a score with an explicit timestamp (ms)
    pub async fn submit_at(
        &self,
        identity: &Identity,
        score: u64,
        distance: f64,
        device_id: &DeviceId,
        timestamp: i64,
    ) -> bool {
        let submission = ScoreSubmission {
            username: identity.to_string(),
            score,
            distance,
            browser_id: device_id.to_string(),
            timestamp,
        };

        let saved = match &self.backing {
            Backing::Remote(remote) => remote.push(&submission).await,
            Backing::Local(local) => local.append(submission),
        };

        match saved {
            Ok(id) => {
                log::info!("Saved score {score} for {identity} ({id})");
                true
            }
            Err(e) => {
                log::error!("Error saving score: {e}");
                false
            }
        }
    }

    /// Best score per display name, highest first
    pub async fn top_scores(&self, limit: usize) -> Vec<ScoreRecord> {
        match self.history().await {
            Ok(history) => leaderboard::leaderboard_view(&history, limit),
            Err(e) => {
                log::error!("Error getting scores: {e}");
                Vec::new()
            }
        }
    }

    /// Whether `device_id` may play as `identity`. Unreachable stores allow it.
    pub async fn identity_available(&self, identity: &Identity, device_id: &DeviceId) -> bool {
        match self.history().await {
            Ok(history) => {
                leaderboard::identity_available(&history, identity.as_str(), device_id.as_str())
            }
            Err(e) => {
                log::warn!("Error checking username: {e}");
                true
            }
        }
    }

    /// Rank a score against raw history; `None` if the store is unreachable
    pub async fn rank(&self, score: u64) -> Option<u32> {
        match self.history().await {
            Ok(history) => Some(leaderboard::rank_of(&history, score)),
            Err(e) => {
                log::error!("Error getting player rank: {e}");
                None
            }
        }
    }

    /// Erase all history (maintenance only)
    pub async fn clear(&self) -> bool {
        let cleared = match &self.backing {
            Backing::Remote(remote) => remote.clear().await,
            Backing::Local(local) => local.clear(),
        };
        match cleared {
            Ok(()) => {
                log::info!("Score history cleared");
                true
            }
            Err(e) => {
                log::error!("Error clearing scores: {e}");
                false
            }
        }
    }

    #[cfg(test)]
    fn is_remote(&self) -> bool {
        matches!(self.backing, Backing::Remote(_))
    }
}
