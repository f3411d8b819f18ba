//! Leaderboard protocol
//!
//! Score history is an append-only log. Everything the UI shows is derived
//! from it at read time:
//! - the leaderboard view keeps each display name's best score only
//! - rank counts raw history, one slot per record
//! - a display name is blocked once another device has scored under it
//!
//! Equal scores order by timestamp (earliest first), then by log order.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A score as submitted, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub username: String,
    pub score: u64,
    pub distance: f64,
    /// Older clients did not record a device id
    #[serde(default)]
    pub browser_id: String,
    /// Unix timestamp (ms)
    pub timestamp: i64,
}

/// A persisted score (immutable once written)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Store-assigned key
    pub id: String,
    pub username: String,
    pub score: u64,
    pub distance: f64,
    #[serde(default)]
    pub browser_id: String,
    /// Unix timestamp (ms)
    pub timestamp: i64,
}

impl ScoreRecord {
    pub fn with_id(id: impl Into<String>, submission: ScoreSubmission) -> Self {
        Self {
            id: id.into(),
            username: submission.username,
            score: submission.score,
            distance: submission.distance,
            browser_id: submission.browser_id,
            timestamp: submission.timestamp,
        }
    }
}

/// Score descending, then timestamp ascending
fn by_rank(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.timestamp.cmp(&b.timestamp))
}

/// Best record per display name, ranked, truncated to `limit`
pub fn leaderboard_view(history: &[ScoreRecord], limit: usize) -> Vec<ScoreRecord> {
    let mut best: Vec<&ScoreRecord> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for record in history {
        match slot.get(record.username.as_str()) {
            Some(&i) => {
                if by_rank(record, best[i]) == Ordering::Less {
                    best[i] = record;
                }
            }
            None => {
                slot.insert(record.username.as_str(), best.len());
                best.push(record);
            }
        }
    }

    // Stable sort keeps log order for full ties
    best.sort_by(|a, b| by_rank(a, b));
    best.into_iter().take(limit).cloned().collect()
}

/// 1 + number of records (not names) with a strictly greater score
pub fn rank_of(history: &[ScoreRecord], score: u64) -> u32 {
    let above = history.iter().filter(|r| r.score > score).count();
    u32::try_from(above).unwrap_or(u32::MAX - 1) + 1
}

/// False only when another device has already scored under `username`
pub fn identity_available(history: &[ScoreRecord], username: &str, browser_id: &str) -> bool {
    !history
        .iter()
        .any(|r| r.username == username && r.browser_id != browser_id)
}

/// Keep the `cap` highest scores; among equal scores older records survive
pub fn retain_top(history: &mut Vec<ScoreRecord>, cap: usize) {
    history.sort_by(by_rank);
    history.truncate(cap);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, username: &str, score: u64, browser_id: &str) -> ScoreRecord {
        ScoreRecord {
            id: format!("r{id}"),
            username: username.to_string(),
            score,
            distance: score as f64,
            browser_id: browser_id.to_string(),
            timestamp: 1_700_000_000_000 + i64::from(id),
        }
    }

    fn names_and_scores(view: &[ScoreRecord]) -> Vec<(&str, u64)> {
        view.iter().map(|r| (r.username.as_str(), r.score)).collect()
    }

    #[test]
    fn test_view_keeps_best_per_name() {
        let history = [
            record(1, "A", 10, "d1"),
            record(2, "A", 30, "d1"),
            record(3, "B", 20, "d2"),
        ];
        let view = leaderboard_view(&history, 10);
        assert_eq!(names_and_scores(&view), vec![("A", 30), ("B", 20)]);
        assert_eq!(view[0].id, "r2");
    }

    #[test]
    fn test_view_respects_limit() {
        let history: Vec<_> = (0..20)
            .map(|i| record(i, &format!("p{i}"), u64::from(i) * 10, "d"))
            .collect();
        let view = leaderboard_view(&history, 5);
        assert_eq!(view.len(), 5);
        assert_eq!(view[0].score, 190);
        assert_eq!(view[4].score, 150);
        assert!(leaderboard_view(&history, 0).is_empty());
    }

    #[test]
    fn test_view_ties_break_by_timestamp() {
        let mut late = record(1, "late", 50, "d");
        late.timestamp = 2_000;
        let mut early = record(2, "early", 50, "d");
        early.timestamp = 1_000;

        let view = leaderboard_view(&[late, early], 10);
        assert_eq!(names_and_scores(&view), vec![("early", 50), ("late", 50)]);
    }

    #[test]
    fn test_view_same_name_tie_keeps_earliest() {
        let history = [record(1, "A", 40, "d"), record(2, "A", 40, "d")];
        let view = leaderboard_view(&history, 10);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "r1");
    }

    #[test]
    fn test_view_of_empty_history() {
        assert!(leaderboard_view(&[], 10).is_empty());
    }

    #[test]
    fn test_rank_counts_raw_history() {
        let history = [
            record(1, "A", 10, "d"),
            record(2, "B", 30, "d"),
            record(3, "C", 20, "d"),
            record(4, "D", 25, "d"),
        ];
        assert_eq!(rank_of(&history, 25), 2);
        assert_eq!(rank_of(&history, 31), 1);
        assert_eq!(rank_of(&history, 0), 5);
    }

    #[test]
    fn test_rank_does_not_dedup_names() {
        let history = [record(1, "A", 30, "d"), record(2, "A", 40, "d")];
        assert_eq!(rank_of(&history, 10), 3);
        assert_eq!(leaderboard_view(&history, 10).len(), 1);
    }

    #[test]
    fn test_identity_guard() {
        let other_device = [record(1, "A", 5, "dev2")];
        assert!(!identity_available(&other_device, "A", "dev1"));

        let same_device = [record(1, "A", 5, "dev1"), record(2, "A", 9, "dev1")];
        assert!(identity_available(&same_device, "A", "dev1"));

        let unused = [record(1, "B", 5, "dev2")];
        assert!(identity_available(&unused, "A", "dev1"));

        let mixed = [record(1, "A", 5, "dev1"), record(2, "A", 9, "dev2")];
        assert!(!identity_available(&mixed, "A", "dev1"));
    }

    #[test]
    fn test_retain_top_drops_lowest() {
        let mut history: Vec<_> = (0..101).map(|i| record(i, "p", u64::from(i) + 1, "d")).collect();
        history.push(record(200, "p", 0, "d"));
        retain_top(&mut history, 100);
        assert_eq!(history.len(), 100);
        assert_eq!(history[0].score, 101);
        assert_eq!(history[99].score, 2);
    }

    #[test]
    fn test_legacy_record_without_browser_id() {
        let json = r#"[{"id":"1700000000000","username":"Siew","score":42,"distance":42,"timestamp":1700000000000}]"#;
        let history: Vec<ScoreRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(history[0].browser_id, "");
        assert_eq!(history[0].distance, 42.0);
    }

    #[test]
    fn test_persisted_field_names() {
        let value = serde_json::to_value(record(1, "A", 3, "dev")).unwrap();
        for key in ["id", "username", "score", "distance", "browserId", "timestamp"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
