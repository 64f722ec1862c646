// ============================================================================
// MASTERS - Carga de datos maestros (items / almacenes / proveedores)
// ============================================================================
// Cacheados 5 minutos en el cliente para acelerar autocomplete y navegación
// (el backend mantiene su propio caché además).
// ============================================================================

use serde_json::{json, Value};

use crate::config::CONFIG;
use crate::models::{ItemRef, VendorRef, WarehouseRef};
use crate::services::api::ApiClient;
use crate::services::cache::{
    LocalCache, KEY_MASTERS_ITEMS, KEY_MASTERS_VENDORS, KEY_MASTERS_WAREHOUSES,
};
use crate::utils::pick_array;

pub struct TxMasters {
    pub items: Vec<ItemRef>,
    pub warehouses: Vec<WarehouseRef>,
}

/// Items + almacenes para los formularios de Receive/Issue/Requisitions.
pub async fn load_tx_masters(api: &ApiClient, cache: &LocalCache) -> TxMasters {
    let cached_items: Option<Vec<Value>> = cache.get(KEY_MASTERS_ITEMS);
    let cached_wh: Option<Vec<Value>> = cache.get(KEY_MASTERS_WAREHOUSES);

    if let (Some(items), Some(warehouses)) = (&cached_items, &cached_wh) {
        if !items.is_empty() && !warehouses.is_empty() {
            log::debug!("📋 [MASTERS] Usando masters del caché");
            return TxMasters {
                items: items.iter().map(ItemRef::from_value).collect(),
                warehouses: warehouses.iter().map(WarehouseRef::from_value).collect(),
            };
        }
    }

    let r_items = api.call("list_items", json!({})).await;
    let r_wh = api.call("list_warehouses", json!({})).await;

    let items_raw = if r_items.ok {
        let raw = pick_array(&r_items.raw, &["data.items", "items", "data"]);
        cache.set(KEY_MASTERS_ITEMS, &raw, CONFIG.masters_cache_ttl_ms);
        raw
    } else {
        Vec::new()
    };
    let wh_raw = if r_wh.ok {
        let raw = pick_array(&r_wh.raw, &["data.warehouses", "warehouses", "data"]);
        cache.set(KEY_MASTERS_WAREHOUSES, &raw, CONFIG.masters_cache_ttl_ms);
        raw
    } else {
        Vec::new()
    };

    TxMasters {
        items: items_raw.iter().map(ItemRef::from_value).collect(),
        warehouses: wh_raw.iter().map(WarehouseRef::from_value).collect(),
    }
}

/// Solo items (página de requisiciones).
pub async fn load_items(api: &ApiClient, cache: &LocalCache) -> Vec<ItemRef> {
    if let Some(cached) = cache.get::<Vec<Value>>(KEY_MASTERS_ITEMS) {
        if !cached.is_empty() {
            return cached.iter().map(ItemRef::from_value).collect();
        }
    }
    let res = api.call("list_items", json!({})).await;
    if !res.ok {
        return Vec::new();
    }
    let raw = pick_array(&res.raw, &["data.items", "items", "data"]);
    cache.set(KEY_MASTERS_ITEMS, &raw, CONFIG.masters_cache_ttl_ms);
    raw.iter().map(ItemRef::from_value).collect()
}

/// Proveedores para el autocomplete de recepción. Mismo TTL que los demás
/// masters; el upsert de admin invalida la clave.
pub async fn load_vendors(api: &ApiClient, cache: &LocalCache) -> Vec<VendorRef> {
    if let Some(cached) = cache.get::<Vec<Value>>(KEY_MASTERS_VENDORS) {
        if !cached.is_empty() {
            return cached.iter().map(VendorRef::from_value).collect();
        }
    }
    let res = api.call("list_vendors", json!({})).await;
    if !res.ok {
        return Vec::new();
    }
    let raw = pick_array(&res.raw, &["data.vendors", "vendors", "data"]);
    cache.set(KEY_MASTERS_VENDORS, &raw, CONFIG.masters_cache_ttl_ms);
    raw.iter().map(VendorRef::from_value).collect()
}

pub fn invalidate_item_masters(cache: &LocalCache) {
    cache.clear(KEY_MASTERS_ITEMS);
}

pub fn invalidate_warehouse_masters(cache: &LocalCache) {
    cache.clear(KEY_MASTERS_WAREHOUSES);
}

pub fn invalidate_vendor_masters(cache: &LocalCache) {
    cache.clear(KEY_MASTERS_VENDORS);
}
