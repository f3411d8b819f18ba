//! Firebase Realtime Database over its REST API
//!
//! Scores live under `/scores`: `POST` pushes (the response carries the
//! generated key), `GET` returns a key -> record map, `DELETE` clears.
//! Push keys sort chronologically, so a key-ordered map is log order.
//!
//! The log is writable by any client, so children are decoded one at a time
//! and a malformed child is skipped rather than failing the whole read.

use std::collections::BTreeMap;

use super::StoreError;
use crate::leaderboard::{ScoreRecord, ScoreSubmission};

#[cfg(target_arch = "wasm32")]
pub use client::FirebaseRemote;

/// Decode a `GET /scores.json` body into log-ordered records
pub fn decode_log(body: &str) -> Result<Vec<ScoreRecord>, StoreError> {
    // `null` when the log is empty
    let children: Option<BTreeMap<String, serde_json::Value>> = serde_json::from_str(body)?;

    Ok(children
        .unwrap_or_default()
        .into_iter()
        .filter_map(
            |(key, child)| match serde_json::from_value::<ScoreSubmission>(child) {
                Ok(submission) => Some(ScoreRecord::with_id(key, submission)),
                Err(e) => {
                    log::warn!("Skipping malformed score {key}: {e}");
                    None
                }
            },
        )
        .collect())
}

#[cfg(target_arch = "wasm32")]
mod client {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::decode_log;
    use crate::leaderboard::{ScoreRecord, ScoreSubmission};
    use crate::store::StoreError;
    use crate::store::remote::RemoteLog;

    pub struct FirebaseRemote {
        database_url: String,
    }

    #[derive(serde::Deserialize)]
    struct PushResponse {
        name: String,
    }

    fn js_error(e: JsValue) -> StoreError {
        StoreError::Request(format!("{e:?}"))
    }

    impl FirebaseRemote {
        pub fn new(database_url: impl Into<String>) -> Self {
            Self {
                database_url: database_url.into(),
            }
        }

        fn scores_url(&self, query: &str) -> String {
            format!(
                "{}/scores.json{}",
                self.database_url.trim_end_matches('/'),
                query
            )
        }

        async fn send(
            &self,
            method: &str,
            url: &str,
            body: Option<&str>,
        ) -> Result<String, StoreError> {
            let opts = RequestInit::new();
            opts.set_method(method);
            opts.set_mode(RequestMode::Cors);
            if let Some(body) = body {
                opts.set_body(&JsValue::from_str(body));
            }

            let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
            if body.is_some() {
                request
                    .headers()
                    .set("Content-Type", "application/json")
                    .map_err(js_error)?;
            }

            let window =
                web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
            let response: Response = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
                .dyn_into()
                .map_err(js_error)?;

            if !response.ok() {
                return Err(StoreError::Request(format!(
                    "{method} {url}: HTTP {}",
                    response.status()
                )));
            }

            let text = JsFuture::from(response.text().map_err(js_error)?)
                .await
                .map_err(js_error)?;
            Ok(text.as_string().unwrap_or_default())
        }
    }

    impl RemoteLog for FirebaseRemote {
        async fn connect(&self) -> Result<(), StoreError> {
            self.send("GET", &self.scores_url("?shallow=true"), None)
                .await
                .map(|_| ())
        }

        async fn push(&self, submission: &ScoreSubmission) -> Result<String, StoreError> {
            let body = serde_json::to_string(submission)?;
            let text = self.send("POST", &self.scores_url(""), Some(&body)).await?;
            let pushed: PushResponse = serde_json::from_str(&text)?;
            Ok(pushed.name)
        }

        async fn fetch_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
            let text = self.send("GET", &self.scores_url(""), None).await?;
            decode_log(&text)
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.send("DELETE", &self.scores_url(""), None)
                .await
                .map(|_| ())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log_is_null() {
        assert!(decode_log("null").unwrap().is_empty());
        assert!(decode_log("{}").unwrap().is_empty());
    }

    #[test]
    fn test_records_come_back_in_key_order() {
        let body = r#"{
            "-Mb": {"username": "Bob", "score": 12, "distance": 12.5, "browserId": "d2", "timestamp": 2},
            "-Ma": {"username": "Ann", "score": 40, "distance": 40.0, "browserId": "d1", "timestamp": 1}
        }"#;
        let records = decode_log(body).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["-Ma", "-Mb"]);
        assert_eq!(records[0].username, "Ann");
        assert_eq!(records[1].browser_id, "d2");
    }

    #[test]
    fn test_child_without_browser_id() {
        let body = r#"{"-Ma": {"username": "Siew", "score": 7, "distance": 7, "timestamp": 1}}"#;
        let records = decode_log(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].browser_id, "");
    }

    #[test]
    fn test_bad_child_does_not_hide_the_rest() {
        let body = r#"{
            "-a": {"username": "Ann", "score": 40, "distance": 40, "browserId": "d1", "timestamp": 1},
            "-b": {"username": "Bob", "score": 12.5, "distance": 3, "timestamp": 2},
            "-c": {"username": "Cy", "score": -3, "distance": 0, "timestamp": 3},
            "-d": {"username": "Dee", "score": 9, "distance": 9},
            "-e": "garbage"
        }"#;
        let records = decode_log(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "Ann");
        assert_eq!(records[0].score, 40);
    }

    #[test]
    fn test_unreadable_body_is_an_error() {
        assert!(matches!(
            decode_log("<html>"),
            Err(StoreError::Serialization(_))
        ));
        assert!(decode_log("[1, 2]").is_err());
    }
}
