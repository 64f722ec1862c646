// ============================================================================
// STOCK - Tabla de stock con búsqueda y filtro por almacén
// ============================================================================
// El snapshot llega entero (caché 60s) y el filtrado es 100% en cliente:
// teclear en el buscador solo re-pinta el tbody, sin tocar la red.
// ============================================================================

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{
    escape_html, get_element_by_id, input_value, on_change, on_click, on_input, select_value,
    set_inner_html,
};
use crate::models::StockRow;
use crate::router::PageHandle;
use crate::services::stock::load_stock_all;
use crate::utils::{fmt_datetime, fmt_number};
use crate::views::feedback::render_skeleton;

pub async fn render(ctx: Rc<AppContext>, host: &Element) -> Result<PageHandle, String> {
    render_skeleton(host, 8);

    let snapshot = load_stock_all(&ctx.api, &ctx.cache, false)
        .await
        .map_err(|res| res.error_text())?;

    let mut wh_options = String::from(r#"<option value="">ทุกคลัง</option>"#);
    for wh in &snapshot.warehouses {
        wh_options.push_str(&format!(
            r#"<option value="{0}">{0}</option>"#,
            escape_html(wh)
        ));
    }

    set_inner_html(
        host,
        &format!(
            r#"<div class="d-flex justify-content-between align-items-center mb-3">
                <h4 class="mb-0">สต็อกคงเหลือ</h4>
                <div class="d-flex align-items-center gap-2">
                    <span class="text-muted small">ซิงก์ล่าสุด: {}</span>
                    <button id="btn-stock-refresh" class="btn btn-outline-primary btn-sm">🔄 โหลดใหม่</button>
                </div>
            </div>
            <div class="row g-2 mb-3">
                <div class="col-md-6">
                    <input id="stock-search" class="form-control" type="search"
                           placeholder="ค้นหารหัสหรือชื่อรายการ...">
                </div>
                <div class="col-md-3">
                    <select id="stock-wh" class="form-select">{}</select>
                </div>
                <div class="col-md-3 text-end pt-2">
                    <span id="stock-count" class="text-muted small"></span>
                </div>
            </div>
            <table class="table table-sm table-hover">
                <thead><tr>
                    <th>รหัส</th><th>ชื่อรายการ</th><th>คลัง</th>
                    <th class="text-end">คงเหลือ</th><th class="text-end">ขั้นต่ำ</th><th>สถานะ</th>
                </tr></thead>
                <tbody id="stock-tbody"></tbody>
            </table>"#,
            escape_html(&fmt_datetime(snapshot.last_sync.as_deref())),
            wh_options,
        ),
    );

    let rows = Rc::new(snapshot.rows);
    apply_filter(&rows, "", "");

    let wire = |id: &str, rows: Rc<Vec<StockRow>>| -> Result<(), JsValue> {
        let Some(el) = get_element_by_id(id) else {
            return Ok(());
        };
        let refilter = move || {
            let q = input_value("stock-search").trim().to_lowercase();
            let wh = select_value("stock-wh");
            apply_filter(&rows, &q, &wh);
        };
        if id == "stock-search" {
            on_input(&el, move |_| refilter())
        } else {
            on_change(&el, move |_| refilter())
        }
    };
    wire("stock-search", rows.clone()).map_err(|e| format!("{:?}", e))?;
    wire("stock-wh", rows.clone()).map_err(|e| format!("{:?}", e))?;

    if let Some(btn) = get_element_by_id("btn-stock-refresh") {
        let ctx = ctx.clone();
        let host = host.clone();
        on_click(&btn, move |_| {
            let ctx = ctx.clone();
            let host = host.clone();
            spawn_local(async move {
                crate::services::stock::invalidate_stock_cache(&ctx.cache);
                // re-monta la página entera con datos frescos
                let _ = Box::pin(render(ctx, &host)).await;
            });
        })
        .map_err(|e| format!("{:?}", e))?;
    }

    Ok(PageHandle::empty())
}

fn apply_filter(rows: &[StockRow], query: &str, warehouse: &str) {
    let visible: Vec<&StockRow> = rows
        .iter()
        .filter(|r| r.matches(query, warehouse))
        .collect();

    if let Some(counter) = get_element_by_id("stock-count") {
        counter.set_text_content(Some(&format!("{} รายการ", visible.len())));
    }
    if let Some(tbody) = get_element_by_id("stock-tbody") {
        set_inner_html(&tbody, &rows_html(&visible));
    }
}

fn rows_html(rows: &[&StockRow]) -> String {
    if rows.is_empty() {
        return r#"<tr><td colspan="6" class="text-center text-muted py-4">ไม่พบรายการ</td></tr>"#
            .to_string();
    }
    let mut html = String::new();
    for row in rows {
        let row_class = if row.is_low() { " class=\"table-danger\"" } else { "" };
        let badge = if row.is_low() {
            "badge bg-danger"
        } else {
            "badge bg-success"
        };
        html.push_str(&format!(
            r#"<tr{}><td>{}</td><td>{}</td><td>{}</td><td class="text-end">{}</td><td class="text-end">{}</td><td><span class="{}">{}</span></td></tr>"#,
            row_class,
            escape_html(&row.item_code),
            escape_html(&row.name),
            escape_html(&row.warehouse),
            fmt_number(Some(row.on_hand)),
            fmt_number(Some(row.minimum)),
            badge,
            escape_html(&row.display_status()),
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(code: &str, on_hand: f64, minimum: f64) -> StockRow {
        StockRow::from_value(&json!({
            "item_code": code, "name": code, "warehouse": "MAIN",
            "on_hand": on_hand, "minimum": minimum
        }))
    }

    #[test]
    fn low_rows_get_danger_styling() {
        let low = row("A", 1.0, 5.0);
        let ok = row("B", 10.0, 5.0);
        let html = rows_html(&[&low, &ok]);
        assert!(html.contains("table-danger"));
        assert!(html.contains("bg-danger"));
        assert!(html.contains("bg-success"));
    }

    #[test]
    fn empty_result_shows_placeholder_row() {
        let html = rows_html(&[]);
        assert!(html.contains("ไม่พบรายการ"));
    }
}
