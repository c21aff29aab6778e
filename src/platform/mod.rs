//! Platform abstraction layer
//!
//! Picks the storage backend for the current target: LocalStorage in the
//! browser, an in-memory store natively (or when LocalStorage is blocked).

use crate::persistence::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use crate::persistence::{KeyValueStore, StorageError};

    /// Browser LocalStorage
    pub struct LocalStore {
        storage: web_sys::Storage,
    }

    impl LocalStore {
        pub fn open() -> Option<Self> {
            let storage = web_sys::window()?.local_storage().ok()??;
            Some(Self { storage })
        }
    }

    fn backend(e: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Backend(format!("{:?}", e))
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage.get_item(key).map_err(backend)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage.set_item(key, value).map_err(backend)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage.remove_item(key).map_err(backend)
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStore;

/// Best available store for this platform
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStore::open() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("LocalStorage unavailable - records will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

/// Best available store for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(MemoryStore::new())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_native_store_is_writable() {
        let mut store = default_store();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
