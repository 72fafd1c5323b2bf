//! Durable token persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! The manager is the only writer. The outbound HTTP layer reads the access
//! token from here so every request carries the freshest credential.
//!
//! TRADE-OFFS
//! ==========
//! Browser storage offers no transactions. `save` encodes every value before
//! the first write and clears on a failed write, so a reader either sees the
//! complete previous session, the complete new one, or nothing.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::collections::HashMap;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::StorageError;
use crate::types::{Session, User};

/// Storage keys, shared with any tooling that inspects `localStorage`.
pub mod keys {
    pub const USER: &str = "user";
    pub const ACCESS_TOKEN: &str = "token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const ACCESS_EXPIRES_AT: &str = "expires_at";
    pub const REFRESH_EXPIRES_AT: &str = "refresh_expires_at";

    /// Every key written by a session save, in write order.
    pub const ALL: [&str; 5] = [USER, ACCESS_TOKEN, REFRESH_TOKEN, ACCESS_EXPIRES_AT, REFRESH_EXPIRES_AT];
}

/// Minimal string key/value storage.
pub trait KeyValueStore {
    /// Read `key`, returning `None` when it is not set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process key/value store. Used for native builds and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Persistence contract for the authenticated session.
pub trait TokenStore {
    /// Persist every session field, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if any field cannot be written.
    fn save(&self, session: &Session) -> Result<(), StorageError>;

    /// Load the stored session; `None` if any field is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] for undecodable fields and
    /// [`StorageError::Unavailable`] when the backend cannot be read.
    fn load(&self) -> Result<Option<Session>, StorageError>;

    /// Remove every session field.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;

    /// Current access token, for attaching to outbound requests.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn access_token(&self) -> Result<Option<String>, StorageError>;
}

/// [`TokenStore`] laid out as five string entries of a [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct KeyValueTokenStore<S> {
    kv: S,
}

impl<S: KeyValueStore> KeyValueTokenStore<S> {
    #[must_use]
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Borrow the underlying key/value store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.kv
    }

    fn read_time(&self, key: &'static str) -> Result<Option<OffsetDateTime>, StorageError> {
        let Some(raw) = self.kv.get(key)? else {
            return Ok(None);
        };
        OffsetDateTime::parse(&raw, &Rfc3339)
            .map(Some)
            .map_err(|e| StorageError::Corrupt { key, reason: e.to_string() })
    }
}

fn encode_time(key: &'static str, value: OffsetDateTime) -> Result<String, StorageError> {
    value
        .format(&Rfc3339)
        .map_err(|e| StorageError::Corrupt { key, reason: e.to_string() })
}

impl<S: KeyValueStore> TokenStore for KeyValueTokenStore<S> {
    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)
            .map_err(|e| StorageError::Corrupt { key: keys::USER, reason: e.to_string() })?;
        let entries = [
            (keys::USER, user),
            (keys::ACCESS_TOKEN, session.access_token.clone()),
            (keys::REFRESH_TOKEN, session.refresh_token.clone()),
            (keys::ACCESS_EXPIRES_AT, encode_time(keys::ACCESS_EXPIRES_AT, session.access_expires_at)?),
            (keys::REFRESH_EXPIRES_AT, encode_time(keys::REFRESH_EXPIRES_AT, session.refresh_expires_at)?),
        ];

        for (key, value) in &entries {
            if let Err(err) = self.kv.set(key, value) {
                if let Err(clear_err) = self.clear() {
                    log::warn!("token store: clear after failed save also failed: {clear_err}");
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, StorageError> {
        let Some(raw_user) = self.kv.get(keys::USER)? else {
            return Ok(None);
        };
        let Some(access_token) = self.kv.get(keys::ACCESS_TOKEN)? else {
            return Ok(None);
        };
        let Some(refresh_token) = self.kv.get(keys::REFRESH_TOKEN)? else {
            return Ok(None);
        };
        let Some(access_expires_at) = self.read_time(keys::ACCESS_EXPIRES_AT)? else {
            return Ok(None);
        };
        let Some(refresh_expires_at) = self.read_time(keys::REFRESH_EXPIRES_AT)? else {
            return Ok(None);
        };
        let user: User = serde_json::from_str(&raw_user)
            .map_err(|e| StorageError::Corrupt { key: keys::USER, reason: e.to_string() })?;

        Ok(Some(Session { user, access_token, refresh_token, access_expires_at, refresh_expires_at }))
    }

    fn clear(&self) -> Result<(), StorageError> {
        // Attempt every key even if one fails, then report the first failure.
        let mut first_err = None;
        for key in keys::ALL {
            if let Err(err) = self.kv.remove(key) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.kv.get(keys::ACCESS_TOKEN)
    }
}
