use super::*;
use std::cell::Cell;
use time::macros::datetime;

use crate::testing::{sample_session, sample_user};

/// Key/value store that fails writes after `fail_after` successful sets.
struct FlakyStore {
    inner: MemoryStore,
    sets: Cell<usize>,
    fail_after: usize,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.sets.get() >= self.fail_after {
            return Err(StorageError::Unavailable("quota exceeded".to_owned()));
        }
        self.sets.set(self.sets.get() + 1);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("denied".to_owned()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("denied".to_owned()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("denied".to_owned()))
    }
}

// =============================================================
// save / load
// =============================================================

#[test]
fn save_then_load_returns_same_session() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    let session = sample_session();
    store.save(&session).unwrap();
    assert_eq!(store.load().unwrap(), Some(session));
}

#[test]
fn save_writes_exactly_the_five_keys() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    store.save(&sample_session()).unwrap();
    let kv = store.inner();
    assert_eq!(kv.len(), 5);
    assert_eq!(kv.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("access-1"));
    assert_eq!(kv.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("refresh-1"));
    assert_eq!(kv.get(keys::ACCESS_EXPIRES_AT).unwrap().as_deref(), Some("2026-01-01T01:00:00Z"));
    assert_eq!(kv.get(keys::REFRESH_EXPIRES_AT).unwrap().as_deref(), Some("2026-01-08T00:00:00Z"));
    let user: User = serde_json::from_str(&kv.get(keys::USER).unwrap().unwrap()).unwrap();
    assert_eq!(user, sample_user());
}

#[test]
fn save_replaces_previous_session() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    store.save(&sample_session()).unwrap();
    let mut next = sample_session();
    next.access_token = "access-2".to_owned();
    next.access_expires_at = datetime!(2026-01-01 02:00 UTC);
    store.save(&next).unwrap();
    assert_eq!(store.load().unwrap(), Some(next));
}

#[test]
fn load_empty_store_is_absent() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn load_with_any_missing_field_is_absent() {
    for missing in keys::ALL {
        let store = KeyValueTokenStore::new(MemoryStore::new());
        store.save(&sample_session()).unwrap();
        store.inner().remove(missing).unwrap();
        assert_eq!(store.load().unwrap(), None, "missing {missing}");
    }
}

#[test]
fn load_rejects_unparsable_expiry() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    store.save(&sample_session()).unwrap();
    store.inner().set(keys::ACCESS_EXPIRES_AT, "tomorrow").unwrap();
    assert!(matches!(
        store.load(),
        Err(StorageError::Corrupt { key: keys::ACCESS_EXPIRES_AT, .. })
    ));
}

#[test]
fn load_rejects_corrupt_user_json() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    store.save(&sample_session()).unwrap();
    store.inner().set(keys::USER, "{not json").unwrap();
    assert!(matches!(store.load(), Err(StorageError::Corrupt { key: keys::USER, .. })));
}

#[test]
fn failed_partial_save_leaves_nothing_behind() {
    let store = KeyValueTokenStore::new(FlakyStore { inner: MemoryStore::new(), sets: Cell::new(0), fail_after: 2 });
    let err = store.save(&sample_session()).unwrap_err();
    assert_eq!(err, StorageError::Unavailable("quota exceeded".to_owned()));
    assert!(store.inner().inner.is_empty());
}

// =============================================================
// clear / access_token
// =============================================================

#[test]
fn clear_removes_every_field() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    store.save(&sample_session()).unwrap();
    store.clear().unwrap();
    assert!(store.inner().is_empty());
    assert_eq!(store.access_token().unwrap(), None);
}

#[test]
fn clear_leaves_unrelated_keys() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    store.inner().set("tenant", "{}").unwrap();
    store.save(&sample_session()).unwrap();
    store.clear().unwrap();
    assert_eq!(store.inner().get("tenant").unwrap().as_deref(), Some("{}"));
}

#[test]
fn access_token_reads_current_value() {
    let store = KeyValueTokenStore::new(MemoryStore::new());
    store.save(&sample_session()).unwrap();
    assert_eq!(store.access_token().unwrap().as_deref(), Some("access-1"));
}

#[test]
fn unavailable_backend_surfaces_errors() {
    let store = KeyValueTokenStore::new(BrokenStore);
    assert!(matches!(store.load(), Err(StorageError::Unavailable(_))));
    assert!(matches!(store.clear(), Err(StorageError::Unavailable(_))));
    assert!(store.save(&sample_session()).is_err());
}
