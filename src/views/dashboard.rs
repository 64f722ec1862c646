// ============================================================================
// DASHBOARD - KPIs, stock bajo mínimo y items más solicitados
// ============================================================================
// La página se refresca sola cada pocos segundos en silencio (sin skeleton,
// sin parpadeo). El timer se cancela en el cleanup del router; el flag alive
// cubre la ventana entre cancelar y un fetch que ya estaba en vuelo.
// ============================================================================

use serde_json::{json, Value};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::app::AppContext;
use crate::config::CONFIG;
use crate::dom::{escape_html, get_element_by_id, on_click, set_inner_html};
use crate::models::Role;
use crate::router::PageHandle;
use crate::utils::{fmt_datetime, fmt_number, pick_array, pick_f64, pick_str};
use crate::views::feedback::{render_skeleton, show_toast};

pub async fn render(ctx: Rc<AppContext>, host: &Element) -> Result<PageHandle, String> {
    render_skeleton(host, 6);

    let res = ctx.api.call("dashboard_snapshot", json!({})).await;
    if !res.ok {
        return Err(res.error_text());
    }
    mount(&ctx, host, &res.data()).map_err(|e| format!("{:?}", e))?;

    // poll silencioso: solo re-pinta si la página sigue montada y el fetch salió bien
    let alive = Rc::new(Cell::new(true));
    let interval = {
        let ctx = ctx.clone();
        let host = host.clone();
        let alive = alive.clone();
        gloo_timers::callback::Interval::new(CONFIG.dashboard_poll_ms, move || {
            let ctx = ctx.clone();
            let host = host.clone();
            let alive = alive.clone();
            spawn_local(async move {
                let res = ctx.api.call("dashboard_snapshot", json!({})).await;
                if alive.get() && res.ok {
                    let _ = mount(&ctx, &host, &res.data());
                }
            });
        })
    };

    let alive_for_cleanup = alive.clone();
    Ok(PageHandle::with_cleanup(move || {
        alive_for_cleanup.set(false);
        drop(interval);
    }))
}

fn mount(ctx: &Rc<AppContext>, host: &Element, data: &Value) -> Result<(), JsValue> {
    let can_refresh = matches!(ctx.store.role(), Some(Role::Admin) | Some(Role::Store));
    let refresh_btn = if can_refresh {
        r#"<button id="btn-dash-refresh" class="btn btn-outline-primary btn-sm">🔄 รีเฟรชข้อมูล</button>"#
    } else {
        ""
    };

    let last_sync = pick_str(data, &["last_sync_time", "lastSyncTime"]);
    set_inner_html(
        host,
        &format!(
            r#"<div class="d-flex justify-content-between align-items-center mb-3">
                <h4 class="mb-0">แดชบอร์ด</h4>
                <div class="d-flex align-items-center gap-2">
                    <span class="text-muted small">อัปเดตล่าสุด: {}</span>
                    {}
                </div>
            </div>
            <div class="row g-3 mb-3">{}</div>
            <div class="row g-3">
                <div class="col-lg-7">
                    <div class="card"><div class="card-body">
                        <h6>⚠️ สต็อกต่ำกว่าขั้นต่ำ</h6>
                        {}
                    </div></div>
                </div>
                <div class="col-lg-5">
                    <div class="card"><div class="card-body">
                        <h6>📈 จ่ายออกมากที่สุด</h6>
                        {}
                    </div></div>
                </div>
            </div>"#,
            escape_html(&fmt_datetime(last_sync.as_deref())),
            refresh_btn,
            kpi_cards_html(data),
            low_stock_table_html(data),
            top_issue_table_html(data),
        ),
    );

    if can_refresh {
        if let Some(btn) = get_element_by_id("btn-dash-refresh") {
            let ctx = ctx.clone();
            let host = host.clone();
            on_click(&btn, move |_| {
                let ctx = ctx.clone();
                let host = host.clone();
                spawn_local(async move {
                    let res = ctx.api.call("refresh_dashboard", json!({})).await;
                    if !res.ok {
                        show_toast(&res.error_text(), false);
                        return;
                    }
                    let snap = ctx.api.call("dashboard_snapshot", json!({})).await;
                    if snap.ok {
                        let _ = mount(&ctx, &host, &snap.data());
                        show_toast("รีเฟรชข้อมูลแล้ว", true);
                    }
                });
            })?;
        }
    }
    Ok(())
}

fn kpi_card(label: &str, value: &str, accent: &str) -> String {
    format!(
        r#"<div class="col-6 col-md-3">
            <div class="card border-{accent}"><div class="card-body text-center">
                <div class="fs-4 fw-bold">{value}</div>
                <div class="text-muted small">{label}</div>
            </div></div>
        </div>"#,
    )
}

fn kpi_cards_html(data: &Value) -> String {
    let total = pick_f64(
        data,
        &["kpis.total_items", "kpis.totalItems", "kpis.active_items", "total_items"],
    );
    let on_hand = pick_f64(
        data,
        &["kpis.total_on_hand", "kpis.totalOnHand", "total_on_hand"],
    );
    let low = pick_f64(data, &["kpis.low_stock_count", "kpis.lowStockCount", "low_stock_count"]);
    let pending = pick_f64(
        data,
        &["kpis.pending_requisitions", "kpis.pendingRequisitions", "pending_requisitions"],
    );

    let mut html = String::new();
    html.push_str(&kpi_card("รายการทั้งหมด", &fmt_number(total), "primary"));
    html.push_str(&kpi_card("คงเหลือรวม", &fmt_number(on_hand), "success"));
    html.push_str(&kpi_card("ต่ำกว่าขั้นต่ำ", &fmt_number(low), "danger"));
    html.push_str(&kpi_card("ใบเบิกค้าง", &fmt_number(pending), "warning"));
    html
}

fn low_stock_table_html(data: &Value) -> String {
    let rows = pick_array(data, &["low_stock", "lowStock"]);
    if rows.is_empty() {
        return r#"<div class="text-muted small">ไม่มีรายการต่ำกว่าขั้นต่ำ</div>"#.to_string();
    }
    let mut body = String::new();
    for row in rows.iter().take(20) {
        let code = pick_str(row, &["item_code", "itemCode"]).unwrap_or_default();
        let name = pick_str(row, &["name_th", "name"]).unwrap_or_default();
        let on_hand = pick_f64(row, &["on_hand", "onHand"]);
        let minimum = pick_f64(row, &["minimum"]);
        body.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td class="text-end text-danger">{}</td><td class="text-end">{}</td></tr>"#,
            escape_html(&code),
            escape_html(&name),
            fmt_number(on_hand),
            fmt_number(minimum),
        ));
    }
    format!(
        r#"<table class="table table-sm mb-0">
            <thead><tr><th>รหัส</th><th>ชื่อ</th><th class="text-end">คงเหลือ</th><th class="text-end">ขั้นต่ำ</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        body
    )
}

fn top_issue_table_html(data: &Value) -> String {
    let rows = pick_array(data, &["top_issue", "topIssue", "top_issued"]);
    if rows.is_empty() {
        return r#"<div class="text-muted small">ยังไม่มีข้อมูลการจ่ายออก</div>"#.to_string();
    }
    let mut body = String::new();
    for row in rows.iter().take(10) {
        let name = pick_str(row, &["name_th", "name", "item_code", "itemCode"]).unwrap_or_default();
        let qty = pick_f64(row, &["qty", "total_qty", "totalQty"]);
        body.push_str(&format!(
            r#"<tr><td>{}</td><td class="text-end">{}</td></tr>"#,
            escape_html(&name),
            fmt_number(qty),
        ));
    }
    format!(
        r#"<table class="table table-sm mb-0">
            <thead><tr><th>รายการ</th><th class="text-end">จำนวน</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpis_read_both_casings_and_default_to_dash() {
        let snake = kpi_cards_html(&json!({ "kpis": { "total_items": 120, "low_stock_count": 4 } }));
        assert!(snake.contains("120"));
        assert!(snake.contains("4"));
        let camel = kpi_cards_html(&json!({ "kpis": { "totalItems": 99 } }));
        assert!(camel.contains("99"));
        // KPIs ausentes se muestran como "-"
        assert!(camel.contains("-"));
    }

    #[test]
    fn low_stock_caps_at_twenty_rows() {
        let rows: Vec<Value> = (0..30)
            .map(|i| json!({ "item_code": format!("IT{:02}", i), "on_hand": 1, "minimum": 5 }))
            .collect();
        let html = low_stock_table_html(&json!({ "low_stock": rows }));
        assert!(html.contains("IT19"));
        assert!(!html.contains("IT20"));
    }

    #[test]
    fn low_stock_escapes_names() {
        let html = low_stock_table_html(&json!({
            "low_stock": [{ "item_code": "X", "name": "<b>ยา</b>", "on_hand": 0, "minimum": 1 }]
        }));
        assert!(html.contains("&lt;b&gt;ยา&lt;/b&gt;"));
        assert!(!html.contains("<b>ยา</b>"));
    }

    #[test]
    fn top_issue_caps_at_ten_rows() {
        let rows: Vec<Value> = (0..15).map(|i| json!({ "name": format!("N{}", i), "qty": i })).collect();
        let html = top_issue_table_html(&json!({ "topIssue": rows }));
        assert!(html.contains("N9"));
        assert!(!html.contains(">N10<"));
    }
}
