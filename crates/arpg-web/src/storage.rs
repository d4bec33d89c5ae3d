use arpg_core::{KeyValueStore, MemoryStore};

/// `window.localStorage`, or an in-memory map when the page has no storage
/// (private browsing, sandboxed iframes). Values then last for the session only.
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
    fallback: MemoryStore,
}

impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable, quest state will not persist");
        }
        Self {
            storage,
            fallback: MemoryStore::new(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        match &self.storage {
            Some(storage) => storage.get_item(key).ok().flatten(),
            None => self.fallback.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match &self.storage {
            Some(storage) => {
                if let Err(err) = storage.set_item(key, value) {
                    log::warn!("localStorage write of {:?} failed: {:?}", key, err);
                }
            }
            None => self.fallback.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) {
        match &self.storage {
            Some(storage) => {
                if let Err(err) = storage.remove_item(key) {
                    log::warn!("localStorage remove of {:?} failed: {:?}", key, err);
                }
            }
            None => self.fallback.remove(key),
        }
    }
}
