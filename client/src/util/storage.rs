//! Browser `localStorage` access.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`BrowserStorage`] is the key/value backend of the session token store.
//! The JSON helpers persist auxiliary records (the created tenant) under
//! their own keys.
//!
//! TRADE-OFFS
//! ==========
//! Native builds have no `localStorage`; every call reports
//! [`StorageError::Unavailable`] so the session manager fails safe to
//! signed-out.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use session::{KeyValueStore, StorageError};

/// Key of the tenant record saved after tenant creation.
pub const TENANT_KEY: &str = "tenant";

#[cfg(feature = "csr")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?;
    match window.local_storage() {
        Ok(Some(storage)) => Ok(storage),
        Ok(None) => Err(StorageError::Unavailable("localStorage disabled".to_owned())),
        Err(err) => Err(StorageError::Unavailable(format!("{err:?}"))),
    }
}

#[cfg(not(feature = "csr"))]
fn local_storage() -> Result<NoStorage, StorageError> {
    Err(StorageError::Unavailable("localStorage requires a browser".to_owned()))
}

/// Uninhabited stand-in so native builds share the csr call sites.
#[cfg(not(feature = "csr"))]
enum NoStorage {}

#[cfg(not(feature = "csr"))]
impl NoStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, String> {
        match *self {}
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), String> {
        match *self {}
    }

    fn remove_item(&self, _key: &str) -> Result<(), String> {
        match *self {}
    }
}

/// [`KeyValueStore`] over `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?.get_item(key).map_err(|e| StorageError::Unavailable(format!("get {key}: {e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?.set_item(key, value).map_err(|e| StorageError::Unavailable(format!("set {key}: {e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?.remove_item(key).map_err(|e| StorageError::Unavailable(format!("remove {key}: {e:?}")))
    }
}

/// Load a JSON value stored under `key`.
///
/// # Errors
///
/// Returns [`StorageError::Unavailable`] without storage and
/// [`StorageError::Corrupt`] for undecodable values.
pub fn load_json<T: DeserializeOwned>(key: &'static str) -> Result<Option<T>, StorageError> {
    let Some(raw) = BrowserStorage.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw).map(Some).map_err(|e| StorageError::Corrupt { key, reason: e.to_string() })
}

/// Save `value` as JSON under `key`.
///
/// # Errors
///
/// Returns [`StorageError::Unavailable`] when storage rejects the write.
pub fn save_json<T: Serialize + ?Sized>(key: &'static str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Corrupt { key, reason: e.to_string() })?;
    BrowserStorage.set(key, &raw)
}
