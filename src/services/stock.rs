// ============================================================================
// STOCK - Snapshot completo del stock con fallback de paginación
// ============================================================================
// Camino rápido: get_stock_summary_all devuelve todo en una respuesta.
// Backends viejos no lo implementan; ahí se pagina get_stock_summary con
// cursor hasta hasMore:false, con tope duro de páginas para no colgar la UI
// si el backend nunca corta.
// ============================================================================

use serde_json::{json, Value};

use crate::config::CONFIG;
use crate::models::{distinct_warehouses, StockRow};
use crate::services::api::{ApiClient, ApiResponse};
use crate::services::cache::{LocalCache, KEY_STOCK_ALL, KEY_STOCK_META, KEY_STOCK_WAREHOUSES};
use crate::utils::{pick_array, pick_bool, pick_f64, pick_str};

pub const STOCK_PAGE_LIMIT: u64 = 200;
/// 50 páginas x 200 filas = 10.000 filas, muy por encima de cualquier
/// inventario real de este sistema.
pub const MAX_STOCK_PAGES: u32 = 50;

pub struct StockSnapshot {
    pub rows: Vec<StockRow>,
    pub warehouses: Vec<String>,
    pub last_sync: Option<String>,
}

/// Acumulador del fallback paginado. Separado del loop de red para poder
/// razonar (y testear) la terminación sin tocar el gateway.
pub struct PageAccumulator {
    rows: Vec<Value>,
    pages: u32,
    cursor: u64,
}

impl PageAccumulator {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            pages: 0,
            cursor: 0,
        }
    }

    pub fn next_cursor(&self) -> u64 {
        self.cursor
    }

    /// Incorpora una página y decide si hay que seguir pidiendo.
    /// Devuelve false cuando el backend dice hasMore:false, cuando llega
    /// una página vacía sin flag, o al alcanzar MAX_STOCK_PAGES.
    pub fn push_page(&mut self, data: &Value) -> bool {
        let page_rows = pick_array(data, &["rows", "items", "data"]);
        let page_len = page_rows.len();
        self.rows.extend(page_rows);
        self.pages += 1;

        let has_more = pick_bool(data, &["hasMore", "has_more"]).unwrap_or(page_len > 0);

        self.cursor = pick_f64(data, &["nextCursor", "next_cursor"])
            .map(|c| c as u64)
            .unwrap_or(self.cursor + STOCK_PAGE_LIMIT);

        if self.pages >= MAX_STOCK_PAGES {
            if has_more {
                log::warn!(
                    "⚠️ [STOCK] Tope de {} páginas alcanzado con hasMore aún activo",
                    MAX_STOCK_PAGES
                );
            }
            return false;
        }
        has_more
    }

    pub fn into_rows(self) -> Vec<Value> {
        self.rows
    }
}

/// Snapshot de stock: caché (60s) -> fetch-all -> fallback paginado.
/// `force` salta el caché pero sigue escribiéndolo al terminar.
pub async fn load_stock_all(
    api: &ApiClient,
    cache: &LocalCache,
    force: bool,
) -> Result<StockSnapshot, ApiResponse> {
    if !force {
        let rows: Option<Vec<Value>> = cache.get(KEY_STOCK_ALL);
        if let Some(raw_rows) = rows {
            if !raw_rows.is_empty() {
                log::debug!("💾 [STOCK] Snapshot servido del caché ({} filas)", raw_rows.len());
                let warehouses: Vec<String> =
                    cache.get(KEY_STOCK_WAREHOUSES).unwrap_or_default();
                let meta: Value = cache.get(KEY_STOCK_META).unwrap_or(Value::Null);
                let rows: Vec<StockRow> = raw_rows.iter().map(StockRow::from_value).collect();
                let warehouses = if warehouses.is_empty() {
                    distinct_warehouses(&rows)
                } else {
                    warehouses
                };
                return Ok(StockSnapshot {
                    rows,
                    warehouses,
                    last_sync: pick_str(&meta, &["last_sync_time", "lastSyncTime"]),
                });
            }
        }
    }

    let mut raw_rows: Vec<Value>;
    let mut last_sync: Option<String> = None;

    let all = api.call("get_stock_summary_all", json!({})).await;
    if all.ok {
        let data = all.data();
        raw_rows = pick_array(&data, &["rows", "items", "data"]);
        last_sync = pick_str(&all.raw, &["last_sync_time", "lastSyncTime"]);
        log::info!("🌐 [STOCK] Fetch-all: {} filas", raw_rows.len());
    } else {
        // backend sin fetch-all: se recorre página a página
        log::info!("🌐 [STOCK] Fetch-all no disponible, paginando");
        let mut acc = PageAccumulator::new();
        loop {
            let page = api
                .call(
                    "get_stock_summary",
                    json!({ "limit": STOCK_PAGE_LIMIT, "cursor": acc.next_cursor() }),
                )
                .await;
            if !page.ok {
                if acc.rows.is_empty() {
                    return Err(page);
                }
                // ya hay filas acumuladas: mejor un snapshot parcial que nada
                log::warn!(
                    "⚠️ [STOCK] Página falló tras {} filas, devolviendo parcial",
                    acc.rows.len()
                );
                break;
            }
            if last_sync.is_none() {
                last_sync = pick_str(&page.raw, &["last_sync_time", "lastSyncTime"]);
            }
            if !acc.push_page(&page.data()) {
                break;
            }
        }
        raw_rows = acc.into_rows();
    }

    raw_rows.retain(|r| !r.is_null());

    let rows: Vec<StockRow> = raw_rows.iter().map(StockRow::from_value).collect();
    let warehouses = distinct_warehouses(&rows);

    cache.set(KEY_STOCK_ALL, &raw_rows, CONFIG.stock_cache_ttl_ms);
    cache.set(KEY_STOCK_WAREHOUSES, &warehouses, CONFIG.stock_cache_ttl_ms);
    cache.set(
        KEY_STOCK_META,
        &json!({ "last_sync_time": last_sync }),
        CONFIG.stock_cache_ttl_ms,
    );

    Ok(StockSnapshot {
        rows,
        warehouses,
        last_sync,
    })
}

pub fn invalidate_stock_cache(cache: &LocalCache) {
    cache.clear(KEY_STOCK_ALL);
    cache.clear(KEY_STOCK_WAREHOUSES);
    cache.clear(KEY_STOCK_META);
}

/// Tras un receive/issue el snapshot quedó viejo: se invalida y se dispara
/// una llamada mínima para que el backend recalcule su propio caché.
pub async fn refresh_stock_summary_quick(api: &ApiClient, cache: &LocalCache) {
    invalidate_stock_cache(cache);
    let res = api
        .call("get_stock_summary", json!({ "limit": 1, "cursor": 0 }))
        .await;
    if !res.ok {
        log::warn!("⚠️ [STOCK] Warm-up tras transacción falló: {}", res.error_text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_stops_on_has_more_false() {
        let mut acc = PageAccumulator::new();
        assert!(acc.push_page(&json!({ "rows": [{"a":1},{"a":2}], "hasMore": true })));
        assert!(!acc.push_page(&json!({ "rows": [{"a":3}], "hasMore": false })));
        assert_eq!(acc.into_rows().len(), 3);
    }

    #[test]
    fn accumulator_stops_on_empty_page_without_flag() {
        let mut acc = PageAccumulator::new();
        assert!(acc.push_page(&json!({ "rows": [{"a":1}] })));
        assert!(!acc.push_page(&json!({ "rows": [] })));
        assert_eq!(acc.into_rows().len(), 1);
    }

    #[test]
    fn accumulator_honors_backend_cursor() {
        let mut acc = PageAccumulator::new();
        acc.push_page(&json!({ "rows": [{"a":1}], "hasMore": true, "nextCursor": 777 }));
        assert_eq!(acc.next_cursor(), 777);
    }

    #[test]
    fn accumulator_advances_cursor_by_limit_when_absent() {
        let mut acc = PageAccumulator::new();
        acc.push_page(&json!({ "rows": [{"a":1}], "hasMore": true }));
        assert_eq!(acc.next_cursor(), STOCK_PAGE_LIMIT);
        acc.push_page(&json!({ "rows": [{"a":2}], "hasMore": true }));
        assert_eq!(acc.next_cursor(), STOCK_PAGE_LIMIT * 2);
    }

    #[test]
    fn accumulator_terminates_at_page_cap_even_with_has_more() {
        let mut acc = PageAccumulator::new();
        let mut iterations = 0u32;
        loop {
            iterations += 1;
            let keep = acc.push_page(&json!({ "rows": [{"a": iterations}], "hasMore": true }));
            if !keep {
                break;
            }
            assert!(iterations <= MAX_STOCK_PAGES, "el loop no terminó");
        }
        assert_eq!(iterations, MAX_STOCK_PAGES);
        assert_eq!(acc.into_rows().len(), MAX_STOCK_PAGES as usize);
    }

    #[test]
    fn accumulator_reads_snake_case_flag() {
        let mut acc = PageAccumulator::new();
        assert!(!acc.push_page(&json!({ "rows": [{"a":1}], "has_more": false })));
    }
}
