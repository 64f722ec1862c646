// ============================================================================
// LOCAL CACHE - Caché clave/valor con TTL sobre el backend de storage
// ============================================================================
// Evita re-pedir datasets grandes (masters, snapshot de stock) en cada
// navegación. Entradas corruptas o vencidas se auto-eliminan en la lectura.
// ============================================================================

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

use crate::utils::KeyValueBackend;

/// Prefijo de namespace: separa el caché de las claves de sesión y evita
/// contaminación cruzada con otros usos de localStorage.
const CACHE_PREFIX: &str = "INV_CACHE:";

// Claves usadas por los servicios (un solo sitio, para que clear() y set()
// nunca diverjan).
pub const KEY_MASTERS_ITEMS: &str = "masters_items";
pub const KEY_MASTERS_WAREHOUSES: &str = "masters_warehouses";
pub const KEY_MASTERS_VENDORS: &str = "masters_vendors";
pub const KEY_STOCK_ALL: &str = "stock_all_v1";
pub const KEY_STOCK_WAREHOUSES: &str = "stock_all_warehouses_v1";
pub const KEY_STOCK_META: &str = "stock_all_meta_v1";

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    v: Value,
    exp: i64,
}

pub struct LocalCache {
    backend: Rc<dyn KeyValueBackend>,
}

impl LocalCache {
    pub fn new(backend: Rc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl_ms: i64) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("⚠️ [CACHE] No se pudo serializar {}: {}", key, e);
                return;
            }
        };
        let entry = CacheEntry {
            v: value,
            exp: now_ms() + ttl_ms.max(0),
        };
        let json = match serde_json::to_string(&entry) {
            Ok(j) => j,
            Err(_) => return,
        };
        // errores de cuota se ignoran: el caché es solo una optimización
        let _ = self.backend.set(&full_key(key), &json);
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, now_ms())
    }

    /// Lectura con reloj explícito (los tests controlan `now`).
    fn get_at<T: DeserializeOwned>(&self, key: &str, now: i64) -> Option<T> {
        let raw = self.backend.get(&full_key(key))?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(e) => e,
            Err(_) => {
                // entrada corrupta: se descarta y queda como ausente
                self.backend.remove(&full_key(key));
                return None;
            }
        };
        if now > entry.exp {
            self.backend.remove(&full_key(key));
            return None;
        }
        serde_json::from_value(entry.v).ok()
    }

    pub fn clear(&self, key: &str) {
        self.backend.remove(&full_key(key));
    }
}

fn full_key(key: &str) -> String {
    format!("{}{}", CACHE_PREFIX, key)
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryBackend;
    use serde_json::json;

    fn cache_with_backend() -> (LocalCache, Rc<MemoryBackend>) {
        let backend = Rc::new(MemoryBackend::new());
        (LocalCache::new(backend.clone()), backend)
    }

    #[test]
    fn get_within_ttl_returns_value() {
        let (cache, _) = cache_with_backend();
        cache.set("k", &json!([1, 2, 3]), 60_000);
        let v: Option<Value> = cache.get("k");
        assert_eq!(v, Some(json!([1, 2, 3])));
    }

    #[test]
    fn expired_entry_is_absent_and_evicted() {
        let (cache, backend) = cache_with_backend();
        cache.set("k", &json!("v"), 1_000);
        let future = now_ms() + 1_001;
        let v: Option<Value> = cache.get_at("k", future);
        assert_eq!(v, None);
        // la entrada vencida se eliminó del storage
        assert!(backend.get(&full_key("k")).is_none());
    }

    #[test]
    fn expiry_is_per_key() {
        let (cache, _) = cache_with_backend();
        cache.set("corta", &json!(1), 1_000);
        cache.set("larga", &json!(2), 10_000_000);
        let future = now_ms() + 5_000;
        assert_eq!(cache.get_at::<Value>("corta", future), None);
        assert_eq!(cache.get_at::<Value>("larga", future), Some(json!(2)));
    }

    #[test]
    fn clear_evicts_unexpired_entry() {
        let (cache, _) = cache_with_backend();
        cache.set("k", &json!("v"), 60_000);
        cache.clear("k");
        assert_eq!(cache.get::<Value>("k"), None);
    }

    #[test]
    fn corrupt_entry_self_heals() {
        let (cache, backend) = cache_with_backend();
        backend.set(&full_key("k"), "no es json").unwrap();
        assert_eq!(cache.get::<Value>("k"), None);
        assert!(backend.get(&full_key("k")).is_none());
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let (cache, _) = cache_with_backend();
        cache.set("k", &json!(1), 60_000);
        cache.set("k", &json!(2), 60_000);
        assert_eq!(cache.get::<Value>("k"), Some(json!(2)));
    }

    #[test]
    fn namespaced_keys_do_not_collide_with_session_keys() {
        let (cache, backend) = cache_with_backend();
        backend.set("sessionToken", "tok").unwrap();
        cache.set("sessionToken", &json!("cacheado"), 60_000);
        // la clave de sesión cruda queda intacta
        assert_eq!(backend.get("sessionToken").as_deref(), Some("tok"));
    }
}
