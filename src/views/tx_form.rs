// ============================================================================
// TX FORM - Formulario compartido de recepción (receive) y despacho (issue)
// ============================================================================
// Las dos transacciones comparten estructura: item + cantidad + almacén, más
// unos campos propios de cada lado. El submit invalida el snapshot de stock
// y dispara el warm-up para que la tabla refleje la transacción al volver.
// ============================================================================

use serde_json::{json, Map, Value};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{
    escape_html, get_element_by_id, input_value, on_click, select_value, set_inner_html,
    set_input_value, set_text_content,
};
use crate::router::PageHandle;
use crate::services::masters::{load_tx_masters, load_vendors};
use crate::services::stock::refresh_stock_summary_quick;
use crate::utils::{fmt_number, pick_f64, pick_str};
use crate::views::feedback::{render_skeleton, show_toast};

pub const DEPARTMENTS: [&str; 3] = ["OPD", "IPD", "IV Chemo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Receive,
    Issue,
}

impl TxKind {
    pub fn action(&self) -> &'static str {
        match self {
            TxKind::Receive => "create_receipt",
            TxKind::Issue => "create_issue",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TxKind::Receive => "📥 รับเข้าคลัง",
            TxKind::Issue => "📤 จ่ายออกจากคลัง",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            TxKind::Receive => "บันทึกรับเข้าสำเร็จ",
            TxKind::Issue => "บันทึกจ่ายออกสำเร็จ",
        }
    }
}

pub async fn render(ctx: Rc<AppContext>, host: &Element, kind: TxKind) -> Result<PageHandle, String> {
    render_skeleton(host, 6);

    let masters = load_tx_masters(&ctx.api, &ctx.cache).await;

    let mut item_options = String::new();
    for item in &masters.items {
        item_options.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            escape_html(&item.code),
            escape_html(&item.name)
        ));
    }
    let mut wh_options = String::from(r#"<option value="">-- เลือกคลัง --</option>"#);
    for wh in &masters.warehouses {
        wh_options.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            escape_html(&wh.code),
            escape_html(&wh.label)
        ));
    }

    let extra_fields = match kind {
        TxKind::Receive => {
            let mut vendor_options = String::new();
            for vendor in load_vendors(&ctx.api, &ctx.cache).await {
                vendor_options.push_str(&format!(
                    r#"<option value="{}">{}</option>"#,
                    escape_html(&vendor.code),
                    escape_html(&vendor.name)
                ));
            }
            format!(
                r#"<div class="col-md-4">
                    <label class="form-label">ผู้ขาย (รหัส)</label>
                    <input id="tx-vendor" class="form-control" list="tx-vendors" type="text">
                    <datalist id="tx-vendors">{}</datalist>
                </div>
                <div class="col-md-4">
                    <label class="form-label">Lot No.</label>
                    <input id="tx-lot" class="form-control" type="text">
                </div>
                <div class="col-md-4">
                    <label class="form-label">วันหมดอายุ</label>
                    <input id="tx-expiry" class="form-control" type="date">
                </div>"#,
                vendor_options
            )
        }
        TxKind::Issue => {
            let mut dept_options = String::from(r#"<option value="">-- เลือกแผนก --</option>"#);
            for dept in DEPARTMENTS {
                dept_options.push_str(&format!(r#"<option value="{0}">{0}</option>"#, dept));
            }
            format!(
                r#"<div class="col-md-6">
                    <label class="form-label">แผนกที่เบิก</label>
                    <select id="tx-dept" class="form-select">{}</select>
                </div>
                <div class="col-md-6">
                    <label class="form-label">ผู้ขอเบิก</label>
                    <input id="tx-requester" class="form-control" type="text">
                </div>"#,
                dept_options
            )
        }
    };

    set_inner_html(
        host,
        &format!(
            r#"<h4 class="mb-3">{title}</h4>
            <div class="card"><div class="card-body">
                <div class="row g-3">
                    <div class="col-md-6">
                        <label class="form-label">รายการ (รหัส)</label>
                        <input id="tx-item" class="form-control" list="tx-items" placeholder="พิมพ์รหัสหรือเลือก...">
                        <datalist id="tx-items">{items}</datalist>
                    </div>
                    <div class="col-md-3">
                        <label class="form-label">จำนวน</label>
                        <input id="tx-qty" class="form-control" type="number" min="0" step="any">
                    </div>
                    <div class="col-md-3">
                        <label class="form-label">หน่วย</label>
                        <input id="tx-uom" class="form-control" type="text" placeholder="เช่น BOX">
                    </div>
                    <div class="col-md-6">
                        <label class="form-label">คลัง</label>
                        <select id="tx-wh" class="form-select">{warehouses}</select>
                    </div>
                    <div class="col-md-6">
                        <label class="form-label">เลขที่อ้างอิง</label>
                        <input id="tx-ref" class="form-control" type="text">
                    </div>
                    {extra}
                    <div class="col-12">
                        <label class="form-label">หมายเหตุ</label>
                        <input id="tx-remark" class="form-control" type="text">
                    </div>
                </div>
                <div class="mt-3 d-flex align-items-center gap-3">
                    <button id="btn-tx-submit" class="btn btn-primary">บันทึก</button>
                    <span id="tx-status" class="small"></span>
                </div>
                <div id="tx-result" class="mt-2"></div>
            </div></div>"#,
            title = kind.title(),
            items = item_options,
            warehouses = wh_options,
            extra = extra_fields,
        ),
    );

    if let Some(btn) = get_element_by_id("btn-tx-submit") {
        let ctx = ctx.clone();
        on_click(&btn, move |_| {
            let ctx = ctx.clone();
            let payload = match collect_payload(kind) {
                Ok(p) => p,
                Err(msg) => {
                    set_status(&msg, true);
                    return;
                }
            };
            set_status("กำลังบันทึก...", false);
            spawn_local(async move {
                let res = ctx.api.call(kind.action(), Value::Object(payload)).await;
                if res.ok {
                    set_status("", false);
                    show_toast(kind.success_message(), true);
                    show_result(&res.raw);
                    reset_form();
                    refresh_stock_summary_quick(&ctx.api, &ctx.cache).await;
                } else if res.error_code.as_deref() == Some("INSUFFICIENT_STOCK") {
                    // el backend manda el saldo actual en varios formatos
                    let on_hand = pick_f64(
                        &res.raw,
                        &["on_hand", "details.on_hand", "data.on_hand", "data.onHand"],
                    );
                    set_status(
                        &format!("สต็อกไม่พอ คงเหลือ {} เท่านั้น", fmt_number(on_hand)),
                        true,
                    );
                } else {
                    set_status(&res.error_text(), true);
                }
            });
        })
        .map_err(|e| format!("{:?}", e))?;
    }

    Ok(PageHandle::empty())
}

/// Lee y valida el formulario. Los campos obligatorios cortos-circuitan con
/// un mensaje en tailandés listo para mostrar.
fn collect_payload(kind: TxKind) -> Result<Map<String, Value>, String> {
    let item = input_value("tx-item").trim().to_string();
    let qty: f64 = input_value("tx-qty").trim().parse().unwrap_or(0.0);
    let uom = input_value("tx-uom").trim().to_string();
    let warehouse = select_value("tx-wh");

    if item.is_empty() {
        return Err("กรุณาระบุรายการ".to_string());
    }
    if qty <= 0.0 {
        return Err("จำนวนต้องมากกว่า 0".to_string());
    }
    if warehouse.is_empty() {
        return Err("กรุณาเลือกคลัง".to_string());
    }

    let mut payload = Map::new();
    payload.insert("item_code".to_string(), json!(item));
    payload.insert("qty".to_string(), json!(qty));
    payload.insert("uom".to_string(), json!(uom));
    payload.insert("warehouse".to_string(), json!(warehouse));
    payload.insert("ref_no".to_string(), json!(input_value("tx-ref").trim()));
    payload.insert("remark".to_string(), json!(input_value("tx-remark").trim()));

    match kind {
        TxKind::Receive => {
            payload.insert("vendor_code".to_string(), json!(input_value("tx-vendor").trim()));
            payload.insert("lot_no".to_string(), json!(input_value("tx-lot").trim()));
            payload.insert("expiry_date".to_string(), json!(input_value("tx-expiry").trim()));
        }
        TxKind::Issue => {
            let dept = select_value("tx-dept");
            if dept.is_empty() {
                return Err("กรุณาเลือกแผนก".to_string());
            }
            payload.insert("dept".to_string(), json!(dept));
            payload.insert("requester".to_string(), json!(input_value("tx-requester").trim()));
        }
    }
    Ok(payload)
}

fn reset_form() {
    for id in ["tx-item", "tx-qty", "tx-ref", "tx-remark", "tx-lot", "tx-expiry"] {
        set_input_value(id, "");
    }
}

/// Link al PDF del comprobante, si el backend lo generó.
fn show_result(raw: &Value) {
    let Some(result) = get_element_by_id("tx-result") else {
        return;
    };
    let tx_id = pick_str(raw, &["tx_id", "data.tx_id", "data.txId"]);
    let pdf_url = pick_str(raw, &["pdf_url", "data.pdf_url", "data.pdfUrl"]);

    let mut html = String::new();
    if let Some(tx_id) = tx_id {
        html.push_str(&format!(
            r#"<span class="text-success small">เลขที่เอกสาร: {}</span> "#,
            escape_html(&tx_id)
        ));
    }
    if let Some(url) = pdf_url {
        html.push_str(&format!(
            r#"<a class="btn btn-outline-secondary btn-sm" href="{}" target="_blank" rel="noopener">📄 เปิดเอกสาร PDF</a>"#,
            escape_html(&url)
        ));
    }
    set_inner_html(&result, &html);
}

fn set_status(text: &str, is_error: bool) {
    if let Some(el) = get_element_by_id("tx-status") {
        el.set_class_name(if is_error { "small text-danger" } else { "small text-muted" });
        set_text_content(&el, text);
    }
}
