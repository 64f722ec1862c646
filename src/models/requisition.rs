// ============================================================================
// REQUISITION MODELS - Cabecera y líneas de una requisición
// ============================================================================

use serde_json::Value;

use crate::utils::{pick_f64, pick_str};

#[derive(Debug, Clone, PartialEq)]
pub struct RequisitionSummary {
    pub req_id: String,
    pub status: String,
    pub dept: String,
    pub requester: String,
    pub created_at: String,
}

impl RequisitionSummary {
    pub fn from_value(v: &Value) -> RequisitionSummary {
        RequisitionSummary {
            req_id: pick_str(v, &["req_id", "id", "reqNo"]).unwrap_or_default(),
            status: pick_str(v, &["status"]).unwrap_or_default(),
            dept: pick_str(v, &["dept"]).unwrap_or_default(),
            requester: pick_str(v, &["requester"]).unwrap_or_default(),
            created_at: pick_str(v, &["created_at", "createdAt", "created"]).unwrap_or_default(),
        }
    }

    /// SUBMITTED/ISSUED se muestran como estados "cerrados" (badge verde).
    pub fn is_final(&self) -> bool {
        matches!(self.status.to_uppercase().as_str(), "ISSUED" | "SUBMITTED")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequisitionLine {
    pub item_code: String,
    pub qty: f64,
    pub uom: String,
    pub remark: String,
}

impl RequisitionLine {
    pub fn from_value(v: &Value) -> RequisitionLine {
        RequisitionLine {
            item_code: pick_str(v, &["item_code", "itemCode"]).unwrap_or_default(),
            qty: pick_f64(v, &["qty"]).unwrap_or(0.0),
            uom: pick_str(v, &["uom"]).unwrap_or_default(),
            remark: pick_str(v, &["remark"]).unwrap_or_default(),
        }
    }

    /// Una línea cuenta solo si tiene item, qty > 0 y uom (filtrado defensivo
    /// antes de armar el payload).
    pub fn is_valid(&self) -> bool {
        !self.item_code.is_empty() && self.qty > 0.0 && !self.uom.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_id_fallbacks() {
        assert_eq!(RequisitionSummary::from_value(&json!({ "req_id": "RQ1" })).req_id, "RQ1");
        assert_eq!(RequisitionSummary::from_value(&json!({ "id": "RQ2" })).req_id, "RQ2");
        assert_eq!(RequisitionSummary::from_value(&json!({ "reqNo": "RQ3" })).req_id, "RQ3");
    }

    #[test]
    fn final_states() {
        let mk = |s: &str| RequisitionSummary::from_value(&json!({ "status": s }));
        assert!(mk("issued").is_final());
        assert!(mk("SUBMITTED").is_final());
        assert!(!mk("DRAFT").is_final());
    }

    #[test]
    fn line_validity() {
        let good = RequisitionLine::from_value(&json!({ "item_code": "A", "qty": 1, "uom": "EA" }));
        assert!(good.is_valid());
        let no_qty = RequisitionLine::from_value(&json!({ "item_code": "A", "uom": "EA" }));
        assert!(!no_qty.is_valid());
    }
}
