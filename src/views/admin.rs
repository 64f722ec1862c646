// ============================================================================
// ADMIN - Mantenimiento de datos maestros (items / proveedores / almacenes)
// ============================================================================
// Los upserts invalidan el caché de masters correspondiente: los datalist de
// los formularios de transacción ven el alta en la siguiente carga en vez de
// esperar a que venza el TTL.
// ============================================================================

use serde_json::{json, Value};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{
    escape_html, get_element_by_id, input_value, on_click, set_inner_html, set_input_value,
};
use crate::router::PageHandle;
use crate::services::masters::{
    invalidate_item_masters, invalidate_vendor_masters, invalidate_warehouse_masters,
};
use crate::utils::{fmt_number, pick_array, pick_f64, pick_str};
use crate::views::feedback::{render_skeleton, show_toast};

pub async fn render(ctx: Rc<AppContext>, host: &Element) -> Result<PageHandle, String> {
    render_skeleton(host, 8);

    set_inner_html(
        host,
        r#"<h4 class="mb-3">จัดการข้อมูลหลัก</h4>
        <div class="row g-3">
            <div class="col-lg-5">
                <div class="card"><div class="card-body">
                    <h6>💊 รายการเวชภัณฑ์</h6>
                    <div class="row g-2 mb-2">
                        <div class="col-3"><input id="adm-item-code" class="form-control form-control-sm" placeholder="รหัส"></div>
                        <div class="col-4"><input id="adm-item-name" class="form-control form-control-sm" placeholder="ชื่อ"></div>
                        <div class="col-2"><input id="adm-item-uom" class="form-control form-control-sm" placeholder="หน่วย"></div>
                        <div class="col-2"><input id="adm-item-min" class="form-control form-control-sm" type="number" placeholder="ขั้นต่ำ"></div>
                        <div class="col-1"><button id="btn-adm-item" class="btn btn-primary btn-sm w-100">💾</button></div>
                    </div>
                    <table class="table table-sm mb-0">
                        <thead><tr><th>รหัส</th><th>ชื่อ</th><th>หน่วย</th><th class="text-end">ขั้นต่ำ</th></tr></thead>
                        <tbody id="adm-item-tbody"></tbody>
                    </table>
                </div></div>
            </div>
            <div class="col-lg-4">
                <div class="card"><div class="card-body">
                    <h6>🏢 ผู้ขาย</h6>
                    <div class="row g-2 mb-2">
                        <div class="col-4"><input id="adm-vendor-code" class="form-control form-control-sm" placeholder="รหัส"></div>
                        <div class="col-6"><input id="adm-vendor-name" class="form-control form-control-sm" placeholder="ชื่อ"></div>
                        <div class="col-2"><button id="btn-adm-vendor" class="btn btn-primary btn-sm w-100">💾</button></div>
                    </div>
                    <table class="table table-sm mb-0">
                        <thead><tr><th>รหัส</th><th>ชื่อ</th></tr></thead>
                        <tbody id="adm-vendor-tbody"></tbody>
                    </table>
                </div></div>
            </div>
            <div class="col-lg-3">
                <div class="card"><div class="card-body">
                    <h6>🏬 คลัง</h6>
                    <div class="row g-2 mb-2">
                        <div class="col-4"><input id="adm-wh-code" class="form-control form-control-sm" placeholder="รหัส"></div>
                        <div class="col-6"><input id="adm-wh-name" class="form-control form-control-sm" placeholder="ชื่อ"></div>
                        <div class="col-2"><button id="btn-adm-wh" class="btn btn-primary btn-sm w-100">💾</button></div>
                    </div>
                    <table class="table table-sm mb-0">
                        <thead><tr><th>รหัส</th><th>ชื่อ</th></tr></thead>
                        <tbody id="adm-wh-tbody"></tbody>
                    </table>
                </div></div>
            </div>
        </div>"#,
    );

    let reload_items = section_loader(&ctx, "list_items", "adm-item-tbody", item_rows_html);
    let reload_vendors = section_loader(&ctx, "list_vendors", "adm-vendor-tbody", ref_rows_html);
    let reload_whs = section_loader(&ctx, "list_warehouses", "adm-wh-tbody", ref_rows_html);
    reload_items();
    reload_vendors();
    reload_whs();

    wire_upsert(
        &ctx,
        "btn-adm-item",
        reload_items,
        || {
            let code = input_value("adm-item-code").trim().to_string();
            let name = input_value("adm-item-name").trim().to_string();
            if code.is_empty() || name.is_empty() {
                return None;
            }
            Some((
                "upsert_item",
                json!({
                    "item_code": code,
                    "name": name,
                    "uom": input_value("adm-item-uom").trim(),
                    "minimum": input_value("adm-item-min").trim().parse::<f64>().unwrap_or(0.0),
                }),
                &["adm-item-code", "adm-item-name", "adm-item-uom", "adm-item-min"][..],
            ))
        },
        invalidate_item_masters,
    )
    .map_err(|e| format!("{:?}", e))?;

    wire_upsert(
        &ctx,
        "btn-adm-vendor",
        reload_vendors,
        || {
            let code = input_value("adm-vendor-code").trim().to_string();
            let name = input_value("adm-vendor-name").trim().to_string();
            if code.is_empty() || name.is_empty() {
                return None;
            }
            Some((
                "upsert_vendor",
                json!({ "vendor_code": code, "name": name }),
                &["adm-vendor-code", "adm-vendor-name"][..],
            ))
        },
        invalidate_vendor_masters,
    )
    .map_err(|e| format!("{:?}", e))?;

    wire_upsert(
        &ctx,
        "btn-adm-wh",
        reload_whs,
        || {
            let code = input_value("adm-wh-code").trim().to_string();
            let name = input_value("adm-wh-name").trim().to_string();
            if code.is_empty() || name.is_empty() {
                return None;
            }
            Some((
                "upsert_warehouse",
                json!({ "warehouse_code": code, "name": name }),
                &["adm-wh-code", "adm-wh-name"][..],
            ))
        },
        invalidate_warehouse_masters,
    )
    .map_err(|e| format!("{:?}", e))?;

    Ok(PageHandle::empty())
}

/// Fabrica el recargador de una sección: pide la lista y re-pinta el tbody.
fn section_loader(
    ctx: &Rc<AppContext>,
    action: &'static str,
    tbody_id: &'static str,
    rows_html: fn(&[Value]) -> String,
) -> Rc<dyn Fn()> {
    let ctx = ctx.clone();
    Rc::new(move || {
        let ctx = ctx.clone();
        spawn_local(async move {
            let res = ctx.api.call(action, json!({})).await;
            let Some(tbody) = get_element_by_id(tbody_id) else {
                return;
            };
            if !res.ok {
                set_inner_html(
                    &tbody,
                    &format!(
                        r#"<tr><td colspan="4" class="text-danger small">{}</td></tr>"#,
                        escape_html(&res.error_text())
                    ),
                );
                return;
            }
            let rows = pick_array(
                &res.data(),
                &["rows", "items", "vendors", "warehouses", "data"],
            );
            set_inner_html(&tbody, &rows_html(&rows));
        });
    })
}

/// Cablea un botón de upsert: validación local, llamada, invalidación del
/// caché de masters y recarga de la tabla.
fn wire_upsert<B, I>(
    ctx: &Rc<AppContext>,
    btn_id: &str,
    reload: Rc<dyn Fn()>,
    build: B,
    invalidate: I,
) -> Result<(), JsValue>
where
    B: Fn() -> Option<(&'static str, Value, &'static [&'static str])> + 'static,
    I: Fn(&crate::services::LocalCache) + Copy + 'static,
{
    let Some(btn) = get_element_by_id(btn_id) else {
        return Ok(());
    };
    let ctx = ctx.clone();
    on_click(&btn, move |_| {
        let Some((action, payload, clear_ids)) = build() else {
            show_toast("กรุณากรอกรหัสและชื่อ", false);
            return;
        };
        let ctx = ctx.clone();
        let reload = reload.clone();
        spawn_local(async move {
            let res = ctx.api.call(action, payload).await;
            if !res.ok {
                show_toast(&res.error_text(), false);
                return;
            }
            invalidate(&ctx.cache);
            show_toast("บันทึกข้อมูลหลักแล้ว", true);
            for id in clear_ids {
                set_input_value(id, "");
            }
            reload();
        });
    })
}

fn item_rows_html(rows: &[Value]) -> String {
    if rows.is_empty() {
        return r#"<tr><td colspan="4" class="text-muted small">ไม่มีข้อมูล</td></tr>"#.to_string();
    }
    let mut html = String::new();
    for row in rows {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td class="text-end">{}</td></tr>"#,
            escape_html(&pick_str(row, &["item_code", "itemCode", "code"]).unwrap_or_default()),
            escape_html(&pick_str(row, &["name_th", "name"]).unwrap_or_default()),
            escape_html(&pick_str(row, &["uom"]).unwrap_or_default()),
            fmt_number(pick_f64(row, &["minimum"])),
        ));
    }
    html
}

/// Filas código/nombre (sirve para proveedores y almacenes).
fn ref_rows_html(rows: &[Value]) -> String {
    if rows.is_empty() {
        return r#"<tr><td colspan="2" class="text-muted small">ไม่มีข้อมูล</td></tr>"#.to_string();
    }
    let mut html = String::new();
    for row in rows {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td></tr>"#,
            escape_html(
                &pick_str(row, &["vendor_code", "warehouse_code", "code", "id"]).unwrap_or_default()
            ),
            escape_html(&pick_str(row, &["name_th", "name"]).unwrap_or_default()),
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_rows_read_aliases() {
        let html = item_rows_html(&[json!({ "itemCode": "X1", "name": "ยา", "uom": "BOX", "minimum": 5 })]);
        assert!(html.contains("X1"));
        assert!(html.contains("BOX"));
        assert!(html.contains("5"));
    }

    #[test]
    fn ref_rows_cover_vendor_and_warehouse_shapes() {
        let vendor = ref_rows_html(&[json!({ "vendor_code": "V1", "name": "บ.ยาไทย" })]);
        assert!(vendor.contains("V1"));
        let wh = ref_rows_html(&[json!({ "warehouse_code": "W1", "name_th": "คลังหลัก" })]);
        assert!(wh.contains("คลังหลัก"));
    }

    #[test]
    fn empty_sections_show_placeholder() {
        assert!(item_rows_html(&[]).contains("ไม่มีข้อมูล"));
        assert!(ref_rows_html(&[]).contains("ไม่มีข้อมูล"));
    }
}
