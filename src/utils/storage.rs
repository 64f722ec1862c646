// ============================================================================
// STORAGE - Persistencia clave/valor (localStorage) detrás de un trait
// ============================================================================
// El trait permite inyectar un backend en memoria en los tests; en el
// navegador siempre se usa localStorage.
// ============================================================================

use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use web_sys::Storage;

pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str);
}

/// Backend real: window.localStorage
pub struct LocalStorageBackend;

impl LocalStorageBackend {
    fn storage(&self) -> Option<Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueBackend for LocalStorageBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let storage = self
            .storage()
            .ok_or("No se pudo acceder a localStorage")?;
        storage
            .set_item(key, value)
            .map_err(|_| "Error guardando en localStorage".to_string())
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = self.storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Backend en memoria, usado en tests
#[derive(Default)]
pub struct MemoryBackend {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.map.borrow_mut().remove(key);
    }
}

pub fn save_json<T: Serialize>(
    backend: &dyn KeyValueBackend,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let json = serde_json::to_string(value)
        .map_err(|e| format!("Error serializando datos: {}", e))?;
    backend.set(key, &json)
}

pub fn load_json<T: DeserializeOwned>(backend: &dyn KeyValueBackend, key: &str) -> Option<T> {
    let json = backend.get(key)?;
    serde_json::from_str(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").as_deref(), Some("v"));
        backend.remove("k");
        assert_eq!(backend.get("k"), None);
    }

    #[test]
    fn save_and_load_json() {
        let backend = MemoryBackend::new();
        save_json(&backend, "nums", &vec![1, 2, 3]).unwrap();
        let loaded: Vec<i32> = load_json(&backend, "nums").unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);
    }

    #[test]
    fn load_json_ignores_corrupt_payload() {
        let backend = MemoryBackend::new();
        backend.set("bad", "{not json").unwrap();
        let loaded: Option<Vec<i32>> = load_json(&backend, "bad");
        assert!(loaded.is_none());
    }
}
