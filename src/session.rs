//! Game session
//!
//! Owns the chosen score store, this device's id, the claimed display name
//! and the current run. Async steps are split into a synchronous part that
//! borrows the session and an owned future, so a session kept in a
//! `RefCell` is never borrowed across an await.

use std::rc::Rc;

use crate::identity::{DeviceId, Identity, IdentityError};
use crate::leaderboard::ScoreRecord;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{RunResult, RunState, TickInput, tick};
use crate::store::{RemoteLog, ScoreStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidIdentity(#[from] IdentityError),

    #[error("username {0} is taken")]
    IdentityTaken(String),

    #[error("no username claimed")]
    NoIdentity,
}

/// Everything the game-over screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverReport {
    pub score: u64,
    pub distance: f64,
    /// Whether the score reached a store
    pub submitted: bool,
    /// `None` when the store could not be read
    pub rank: Option<u32>,
    pub leaderboard: Vec<ScoreRecord>,
}

/// A validated name waiting on the availability check
pub struct IdentityClaim<R, S> {
    store: Rc<ScoreStore<R, S>>,
    device_id: DeviceId,
    identity: Identity,
}

impl<R: RemoteLog, S: KeyValueStore> IdentityClaim<R, S> {
    pub async fn verify(self) -> Result<Identity, SessionError> {
        if self
            .store
            .identity_available(&self.identity, &self.device_id)
            .await
        {
            Ok(self.identity)
        } else {
            log::info!("Username {} belongs to another device", self.identity);
            Err(SessionError::IdentityTaken(self.identity.to_string()))
        }
    }
}

/// A finished run waiting to be submitted and ranked
pub struct PendingReport<R, S> {
    store: Rc<ScoreStore<R, S>>,
    device_id: DeviceId,
    identity: Identity,
    result: RunResult,
    limit: usize,
}

impl<R: RemoteLog, S: KeyValueStore> PendingReport<R, S> {
    /// Submit, then rank and fetch the board
    pub async fn resolve(self) -> GameOverReport {
        let RunResult {
            score, distance, ..
        } = self.result;

        let submitted = self
            .store
            .submit(&self.identity, score, distance, &self.device_id)
            .await;
        let rank = self.store.rank(score).await;
        let leaderboard = self.store.top_scores(self.limit).await;

        GameOverReport {
            score,
            distance,
            submitted,
            rank,
            leaderboard,
        }
    }
}

pub struct Session<R, S> {
    store: Rc<ScoreStore<R, S>>,
    settings: Settings,
    device_id: DeviceId,
    identity: Option<Identity>,
    run: Option<RunState>,
}

impl<R: RemoteLog, S: KeyValueStore> Session<R, S> {
    pub fn new(store: Rc<ScoreStore<R, S>>, device_id: DeviceId, settings: Settings) -> Self {
        Self {
            store,
            settings,
            device_id,
            identity: None,
            run: None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Validate a raw name; nothing reaches the store if it is malformed
    pub fn begin_claim(&self, raw: &str) -> Result<IdentityClaim<R, S>, SessionError> {
        let identity = Identity::parse(raw)?;
        Ok(IdentityClaim {
            store: self.store.clone(),
            device_id: self.device_id.clone(),
            identity,
        })
    }

    pub fn set_identity(&mut self, identity: Identity) {
        log::info!("Playing as {identity}");
        self.identity = Some(identity);
    }

    /// Validate and check a name, adopting it when free for this device
    pub async fn claim_identity(&mut self, raw: &str) -> Result<&Identity, SessionError> {
        let identity = self.begin_claim(raw)?.verify().await?;
        log::info!("Playing as {identity}");
        Ok(self.identity.insert(identity))
    }

    /// Start a fresh run, replacing any previous one
    pub fn start_run(&mut self, seed: u64) -> Result<&RunState, SessionError> {
        if self.identity.is_none() {
            return Err(SessionError::NoIdentity);
        }
        let mut run = RunState::new(self.settings.run.clone(), seed);
        run.start();
        Ok(self.run.insert(run))
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    /// A run exists and has not stopped
    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(RunState::is_running)
    }

    /// Tick the current run. Returns the result on the frame it stops.
    pub fn frame(&mut self, input: &TickInput) -> Option<RunResult> {
        self.run.as_mut().and_then(|run| tick(run, input))
    }

    /// Capture what submitting `result` needs
    pub fn report(&self, result: RunResult) -> Result<PendingReport<R, S>, SessionError> {
        let identity = self.identity.clone().ok_or(SessionError::NoIdentity)?;
        Ok(PendingReport {
            store: self.store.clone(),
            device_id: self.device_id.clone(),
            identity,
            result,
            limit: self.settings.leaderboard_size,
        })
    }

    pub async fn finish_run(&self, result: RunResult) -> Result<GameOverReport, SessionError> {
        Ok(self.report(result)?.resolve().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::store::MemoryRemote;

    type TestSession = Session<Rc<MemoryRemote>, MemoryStorage>;

    async fn session(remote: &Rc<MemoryRemote>, device: &str) -> TestSession {
        let settings = Settings::default();
        let store =
            ScoreStore::connect(Some(remote.clone()), MemoryStorage::new(), &settings).await;
        Session::new(Rc::new(store), DeviceId::new(device), settings)
    }

    fn play_until_stopped(session: &mut TestSession) -> RunResult {
        let input = TickInput::default();
        loop {
            if let Some(result) = session.frame(&input) {
                return result;
            }
        }
    }

    #[tokio::test]
    async fn test_claim_rejects_malformed_names() {
        let remote = Rc::new(MemoryRemote::new());
        let mut s = session(&remote, "d1").await;
        assert!(matches!(
            s.claim_identity("ab").await,
            Err(SessionError::InvalidIdentity(IdentityError::TooShort { .. }))
        ));
        assert!(matches!(
            s.claim_identity(&"x".repeat(21)).await,
            Err(SessionError::InvalidIdentity(IdentityError::TooLong { .. }))
        ));
        assert!(s.identity().is_none());
    }

    #[tokio::test]
    async fn test_claim_trims_and_adopts() {
        let remote = Rc::new(MemoryRemote::new());
        let mut s = session(&remote, "d1").await;
        assert_eq!(s.claim_identity("  Ann  ").await.unwrap().as_str(), "Ann");
        assert_eq!(s.identity().map(Identity::as_str), Some("Ann"));
    }

    #[tokio::test]
    async fn test_start_requires_identity() {
        let remote = Rc::new(MemoryRemote::new());
        let mut s = session(&remote, "d1").await;
        assert!(matches!(s.start_run(1), Err(SessionError::NoIdentity)));
        assert!(!s.is_running());
        assert!(s.frame(&TickInput::default()).is_none());
    }

    #[tokio::test]
    async fn test_full_run_reports() {
        let remote = Rc::new(MemoryRemote::new());
        let mut s = session(&remote, "d1").await;
        s.claim_identity("Ann").await.unwrap();
        assert!(s.start_run(7).unwrap().is_running());

        let result = play_until_stopped(&mut s);
        assert_eq!(result.score, 72);
        assert!(s.run().unwrap().is_stopped());
        // Stopped runs stay stopped
        assert!(s.frame(&TickInput::default()).is_none());

        let report = s.finish_run(result).await.unwrap();
        assert!(report.submitted);
        assert_eq!(report.score, 72);
        assert_eq!(report.rank, Some(1));
        assert_eq!(report.leaderboard.len(), 1);
        assert_eq!(report.leaderboard[0].browser_id, "d1");
        assert_eq!(remote.len(), 1);
    }

    #[tokio::test]
    async fn test_name_taken_by_other_device() {
        let remote = Rc::new(MemoryRemote::new());
        let mut first = session(&remote, "d1").await;
        first.claim_identity("Ann").await.unwrap();
        first.start_run(1).unwrap();
        let result = play_until_stopped(&mut first);
        first.finish_run(result).await.unwrap();

        let mut second = session(&remote, "d2").await;
        assert!(matches!(
            second.claim_identity("Ann").await,
            Err(SessionError::IdentityTaken(name)) if name == "Ann"
        ));
        // Same device may keep playing under it
        let mut again = session(&remote, "d1").await;
        assert!(again.claim_identity("Ann").await.is_ok());
    }

    #[tokio::test]
    async fn test_report_after_outage() {
        let remote = Rc::new(MemoryRemote::new());
        let mut s = session(&remote, "d1").await;
        s.claim_identity("Ann").await.unwrap();
        s.start_run(1).unwrap();
        let result = play_until_stopped(&mut s);

        remote.set_offline(true);
        let report = s.finish_run(result).await.unwrap();
        assert!(!report.submitted);
        assert_eq!(report.rank, None);
        assert!(report.leaderboard.is_empty());
    }

    #[tokio::test]
    async fn test_restart_replaces_run() {
        let remote = Rc::new(MemoryRemote::new());
        let mut s = session(&remote, "d1").await;
        s.claim_identity("Ann").await.unwrap();
        s.start_run(1).unwrap();
        play_until_stopped(&mut s);

        assert!(!s.is_running());
        let run = s.start_run(2).unwrap();
        assert!(run.is_running());
        assert_eq!(run.time_ticks, 0);
        assert_eq!(run.seed, 2);
    }
}
