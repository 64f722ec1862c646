// ============================================================================
// STOCK MODELS - Filas del resumen de stock, normalizadas
// ============================================================================

use serde_json::Value;

use crate::utils::{pick_f64, pick_str};

/// Fila del stock summary. El backend alterna snake_case/camelCase según la
/// versión de la hoja; la normalización vive aquí y en ningún otro sitio.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRow {
    pub item_code: String,
    pub name: String,
    pub warehouse: String,
    pub on_hand: f64,
    pub minimum: f64,
    pub status: String,
}

impl StockRow {
    pub fn from_value(v: &Value) -> StockRow {
        StockRow {
            item_code: pick_str(v, &["item_code", "itemCode"]).unwrap_or_default(),
            name: pick_str(v, &["name_th", "name"]).unwrap_or_default(),
            warehouse: pick_str(v, &["warehouse", "warehouse_code", "warehouseCode"])
                .unwrap_or_default(),
            on_hand: pick_f64(v, &["on_hand", "onHand"]).unwrap_or(0.0),
            minimum: pick_f64(v, &["minimum"]).unwrap_or(0.0),
            status: pick_str(v, &["status"]).unwrap_or_default(),
        }
    }

    pub fn is_low(&self) -> bool {
        self.on_hand < self.minimum
    }

    /// Estado a mostrar: el del backend, o LOW/OK calculado si no vino.
    pub fn display_status(&self) -> String {
        if !self.status.is_empty() {
            self.status.clone()
        } else if self.is_low() {
            "LOW".to_string()
        } else {
            "OK".to_string()
        }
    }

    pub fn matches(&self, query: &str, warehouse: &str) -> bool {
        let match_q = query.is_empty()
            || self.item_code.to_lowercase().contains(query)
            || self.name.to_lowercase().contains(query);
        let match_w = warehouse.is_empty() || self.warehouse == warehouse;
        match_q && match_w
    }
}

/// Lista ordenada y sin duplicados de almacenes presentes en las filas.
pub fn distinct_warehouses(rows: &[StockRow]) -> Vec<String> {
    let mut list: Vec<String> = rows
        .iter()
        .map(|r| r.warehouse.clone())
        .filter(|w| !w.is_empty())
        .collect();
    list.sort();
    list.dedup();
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_handles_both_casings() {
        let snake = StockRow::from_value(&json!({
            "item_code": "A1", "name_th": "ยา", "warehouse": "W1",
            "on_hand": 5, "minimum": 10, "status": ""
        }));
        assert_eq!(snake.item_code, "A1");
        assert!(snake.is_low());
        assert_eq!(snake.display_status(), "LOW");

        let camel = StockRow::from_value(&json!({
            "itemCode": "A2", "name": "Item", "warehouseCode": "W2",
            "onHand": "12", "minimum": 3
        }));
        assert_eq!(camel.item_code, "A2");
        assert_eq!(camel.warehouse, "W2");
        assert_eq!(camel.on_hand, 12.0);
        assert_eq!(camel.display_status(), "OK");
    }

    #[test]
    fn matches_filters_by_query_and_warehouse() {
        let row = StockRow::from_value(&json!({
            "item_code": "PARA500", "name_th": "พาราเซตามอล", "warehouse": "MAIN",
            "on_hand": 10, "minimum": 1
        }));
        assert!(row.matches("", ""));
        assert!(row.matches("para", ""));
        assert!(row.matches("", "MAIN"));
        assert!(!row.matches("ibuprofen", ""));
        assert!(!row.matches("para", "SUB"));
    }

    #[test]
    fn distinct_warehouses_sorted_unique() {
        let rows: Vec<StockRow> = ["W2", "W1", "W2", ""]
            .iter()
            .map(|w| StockRow::from_value(&json!({ "item_code": "x", "warehouse": w })))
            .collect();
        assert_eq!(distinct_warehouses(&rows), vec!["W1", "W2"]);
    }
}
