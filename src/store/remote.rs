//! Remote backing: an append-only log reachable over the network
//!
//! The remote side only has to push a record (assigning its key) and hand
//! back the whole log in key order; dedup and ranking happen client-side.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::StoreError;
use crate::leaderboard::{ScoreRecord, ScoreSubmission};

/// Push-append / ordered-query log
#[allow(async_fn_in_trait)]
pub trait RemoteLog {
    /// Verify the log is reachable. Called once at startup.
    async fn connect(&self) -> Result<(), StoreError>;
    /// Append a record, returning its assigned key
    async fn push(&self, submission: &ScoreSubmission) -> Result<String, StoreError>;
    /// Every record, in key order
    async fn fetch_all(&self) -> Result<Vec<ScoreRecord>, StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

impl<T: RemoteLog> RemoteLog for Rc<T> {
    async fn connect(&self) -> Result<(), StoreError> {
        (**self).connect().await
    }

    async fn push(&self, submission: &ScoreSubmission) -> Result<String, StoreError> {
        (**self).push(submission).await
    }

    async fn fetch_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        (**self).fetch_all().await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        (**self).clear().await
    }
}

/// No remote configured; a store built with it always runs locally
#[derive(Debug, Clone, Copy)]
pub enum NoRemote {}

impl RemoteLog for NoRemote {
    async fn connect(&self) -> Result<(), StoreError> {
        match *self {}
    }

    async fn push(&self, _: &ScoreSubmission) -> Result<String, StoreError> {
        match *self {}
    }

    async fn fetch_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        match *self {}
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match *self {}
    }
}

/// In-process log with an outage switch (tests, native demo)
#[derive(Debug, Default)]
pub struct MemoryRemote {
    records: RefCell<Vec<ScoreRecord>>,
    next_key: Cell<u64>,
    offline: Cell<bool>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.get() {
            return Err(StoreError::Unavailable("remote log offline".into()));
        }
        Ok(())
    }
}

impl RemoteLog for MemoryRemote {
    async fn connect(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn push(&self, submission: &ScoreSubmission) -> Result<String, StoreError> {
        self.check()?;
        let n = self.next_key.get();
        self.next_key.set(n + 1);
        // Fixed-width hex sorts in push order
        let key = format!("-M{n:016x}");
        self.records
            .borrow_mut()
            .push(ScoreRecord::with_id(key.clone(), submission.clone()));
        Ok(key)
    }

    async fn fetch_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        self.check()?;
        Ok(self.records.borrow().clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check()?;
        self.records.borrow_mut().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(score: u64) -> ScoreSubmission {
        ScoreSubmission {
            username: "p1".to_string(),
            score,
            distance: score as f64,
            browser_id: "dev".to_string(),
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn test_push_assigns_ordered_keys() {
        let remote = MemoryRemote::new();
        let a = remote.push(&submission(1)).await.unwrap();
        let b = remote.push(&submission(2)).await.unwrap();
        assert!(a < b);

        let all = remote.fetch_all().await.unwrap();
        assert_eq!(all.iter().map(|r| r.id.clone()).collect::<Vec<_>>(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_offline_rejects_everything() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);
        assert!(remote.connect().await.is_err());
        assert!(remote.push(&submission(1)).await.is_err());
        assert!(remote.fetch_all().await.is_err());
        assert!(remote.is_empty());
    }
}
