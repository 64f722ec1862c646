// ============================================================================
// MASTER DATA MODELS - Items, almacenes y proveedores
// ============================================================================

use serde_json::Value;

use crate::utils::pick_str;

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRef {
    pub code: String,
    pub name: String,
}

impl ItemRef {
    pub fn from_value(v: &Value) -> ItemRef {
        ItemRef {
            code: pick_str(v, &["item_code", "itemCode", "code"]).unwrap_or_default(),
            name: pick_str(v, &["name_th", "name"]).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseRef {
    pub code: String,
    pub label: String,
}

impl WarehouseRef {
    pub fn from_value(v: &Value) -> WarehouseRef {
        let code = pick_str(v, &["warehouse_code", "code", "id", "name"]).unwrap_or_default();
        let label = pick_str(v, &["name_th", "name"]).unwrap_or_else(|| code.clone());
        WarehouseRef { code, label }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorRef {
    pub code: String,
    pub name: String,
}

impl VendorRef {
    pub fn from_value(v: &Value) -> VendorRef {
        VendorRef {
            code: pick_str(v, &["vendor_code", "vendorCode", "code", "id"]).unwrap_or_default(),
            name: pick_str(v, &["name_th", "name"]).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_code_fallbacks() {
        assert_eq!(ItemRef::from_value(&json!({ "item_code": "A" })).code, "A");
        assert_eq!(ItemRef::from_value(&json!({ "itemCode": "B" })).code, "B");
        assert_eq!(ItemRef::from_value(&json!({ "code": "C" })).code, "C");
    }

    #[test]
    fn warehouse_label_defaults_to_code() {
        let w = WarehouseRef::from_value(&json!({ "warehouse_code": "W1" }));
        assert_eq!(w.code, "W1");
        assert_eq!(w.label, "W1");
        let named = WarehouseRef::from_value(&json!({ "code": "W2", "name_th": "คลังหลัก" }));
        assert_eq!(named.label, "คลังหลัก");
    }
}
