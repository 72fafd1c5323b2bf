use super::*;

#[cfg(not(feature = "csr"))]
#[test]
fn native_storage_is_unavailable() {
    assert!(matches!(BrowserStorage.get("token"), Err(StorageError::Unavailable(_))));
    assert!(matches!(BrowserStorage.set("token", "x"), Err(StorageError::Unavailable(_))));
    assert!(matches!(BrowserStorage.remove("token"), Err(StorageError::Unavailable(_))));
}

#[cfg(not(feature = "csr"))]
#[test]
fn json_helpers_surface_unavailable_storage() {
    assert!(matches!(load_json::<serde_json::Value>(TENANT_KEY), Err(StorageError::Unavailable(_))));
    assert!(matches!(save_json(TENANT_KEY, &serde_json::json!({ "id": "t-1" })), Err(StorageError::Unavailable(_))));
}

#[cfg(not(feature = "csr"))]
#[test]
fn token_store_over_native_storage_loads_nothing() {
    use session::{KeyValueTokenStore, TokenStore};

    let store = KeyValueTokenStore::new(BrowserStorage);
    assert!(store.load().is_err());
    assert!(store.clear().is_err());
}
