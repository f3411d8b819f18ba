//! `window.localStorage` (WASM only)

use super::{KeyValueStore, StorageError};

pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    /// The page's LocalStorage, if the browser allows it
    pub fn local() -> Result<Self, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
            .ok_or_else(|| StorageError::Unavailable("localStorage is not available".into()))
    }

    fn io_error(key: &str, e: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            reason: format!("{e:?}"),
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| Self::io_error(key, e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| Self::io_error(key, e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| Self::io_error(key, e))
    }
}
