// ============================================================================
// REQUISITIONS - Lista, detalle y creación de ubicaciones de ใบเบิก
// ============================================================================
// Tres vistas en una ruta: la lista (con filtros), el detalle (#/requisitions
// ?id=...) y el formulario de creación. Las líneas del borrador viven en
// estado Rust (Rc<RefCell<Vec<...>>>), no en el DOM: agregar una línea
// re-pinta la tabla desde el vector.
// ============================================================================

use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{
    escape_html, get_element_by_id, input_value, on_click, select_value, set_inner_html,
    set_input_value, set_text_content,
};
use crate::models::{RequisitionLine, RequisitionSummary, Role};
use crate::router::{PageHandle, RouteParams};
use crate::services::masters::load_items;
use crate::utils::{fmt_datetime, fmt_number, pick_array, pick_str};
use crate::views::feedback::{confirm, render_skeleton, show_toast};
use crate::views::tx_form::DEPARTMENTS;

pub async fn render(
    ctx: Rc<AppContext>,
    host: &Element,
    params: &RouteParams,
) -> Result<PageHandle, String> {
    match params.get("id") {
        Some(id) if !id.is_empty() => render_detail(ctx, host, id.to_string()).await,
        _ => render_list(ctx, host).await,
    }
}

// ---------------------------------------------------------------------------
// Detalle
// ---------------------------------------------------------------------------

async fn render_detail(ctx: Rc<AppContext>, host: &Element, req_id: String) -> Result<PageHandle, String> {
    render_skeleton(host, 6);

    let res = ctx
        .api
        .call("get_requisition_detail", json!({ "req_id": req_id }))
        .await;
    if !res.ok {
        return Err(res.error_text());
    }
    let data = res.data();

    let summary = RequisitionSummary::from_value(&data);
    let lines: Vec<RequisitionLine> = pick_array(&data, &["lines", "items"])
        .iter()
        .map(RequisitionLine::from_value)
        .collect();
    let pdf_url = pick_str(&data, &["pdf_url", "pdfUrl"]);

    let pdf_link = pdf_url
        .map(|url| {
            format!(
                r#"<a class="btn btn-outline-secondary btn-sm" href="{}" target="_blank" rel="noopener">📄 เปิดเอกสาร PDF</a>"#,
                escape_html(&url)
            )
        })
        .unwrap_or_default();

    let submit_btn = if summary.status.to_uppercase() == "DRAFT" {
        r#"<button id="btn-req-submit" class="btn btn-primary btn-sm">ส่งใบเบิก</button>"#
    } else {
        ""
    };

    set_inner_html(
        host,
        &format!(
            r##"<div class="d-flex justify-content-between align-items-center mb-3">
                <h4 class="mb-0">ใบเบิก {id}</h4>
                <div class="d-flex gap-2">
                    {submit}{pdf}
                    <a href="#/requisitions" class="btn btn-outline-secondary btn-sm">← กลับ</a>
                </div>
            </div>
            <div class="card mb-3"><div class="card-body">
                <div class="row small">
                    <div class="col-md-3"><span class="text-muted">สถานะ:</span> {status}</div>
                    <div class="col-md-3"><span class="text-muted">แผนก:</span> {dept}</div>
                    <div class="col-md-3"><span class="text-muted">ผู้ขอเบิก:</span> {requester}</div>
                    <div class="col-md-3"><span class="text-muted">วันที่:</span> {created}</div>
                </div>
            </div></div>
            <div class="card"><div class="card-body">{lines}</div></div>
            <div id="req-detail-status" class="small text-danger mt-2"></div>"##,
            id = escape_html(&summary.req_id),
            submit = submit_btn,
            pdf = pdf_link,
            status = status_badge(&summary),
            dept = escape_html(&summary.dept),
            requester = escape_html(&summary.requester),
            created = escape_html(&fmt_datetime(Some(&summary.created_at))),
            lines = lines_table_html(&lines),
        ),
    );

    if let Some(btn) = get_element_by_id("btn-req-submit") {
        let ctx2 = ctx.clone();
        let host2 = host.clone();
        let req_id2 = summary.req_id.clone();
        on_click(&btn, move |_| {
            if !confirm("ยืนยันส่งใบเบิก? หลังส่งแล้วจะแก้ไขไม่ได้") {
                return;
            }
            let ctx = ctx2.clone();
            let host = host2.clone();
            let req_id = req_id2.clone();
            spawn_local(async move {
                let res = submit_requisition(&ctx, &req_id).await;
                match res {
                    Ok(_) => {
                        // re-monta el detalle para mostrar el estado nuevo
                        let _ = Box::pin(render_detail(ctx, &host, req_id)).await;
                    }
                    Err(msg) => {
                        if let Some(el) = get_element_by_id("req-detail-status") {
                            set_text_content(&el, &msg);
                        }
                    }
                }
            });
        })
        .map_err(|e| format!("{:?}", e))?;
    }

    Ok(PageHandle::empty())
}

/// Submit compartido entre el detalle y el formulario de creación.
/// ALREADY_SUBMITTED no es un error para el usuario: el documento ya está
/// donde quería llevarlo.
async fn submit_requisition(ctx: &Rc<AppContext>, req_id: &str) -> Result<(), String> {
    let res = ctx
        .api
        .call("submit_requisition", json!({ "req_id": req_id }))
        .await;
    if res.ok {
        show_toast("ส่งใบเบิกสำเร็จ", true);
        return Ok(());
    }
    if res.error_code.as_deref() == Some("ALREADY_SUBMITTED") {
        show_toast("ใบเบิกนี้ถูกส่งไปแล้ว", true);
        return Ok(());
    }
    Err(res.error_text())
}

// ---------------------------------------------------------------------------
// Lista + creación
// ---------------------------------------------------------------------------

async fn render_list(ctx: Rc<AppContext>, host: &Element) -> Result<PageHandle, String> {
    render_skeleton(host, 8);

    let can_create = matches!(ctx.store.role(), Some(Role::Requester) | Some(Role::Admin));
    let create_btn = if can_create {
        r#"<button id="btn-req-new" class="btn btn-primary btn-sm">+ สร้างใบเบิกใหม่</button>"#
    } else {
        ""
    };

    let items = if can_create {
        load_items(&ctx.api, &ctx.cache).await
    } else {
        Vec::new()
    };
    let mut item_options = String::new();
    for item in &items {
        item_options.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            escape_html(&item.code),
            escape_html(&item.name)
        ));
    }

    let mut dept_options = String::from(r#"<option value="">-- เลือกแผนก --</option>"#);
    for dept in DEPARTMENTS {
        dept_options.push_str(&format!(r#"<option value="{0}">{0}</option>"#, dept));
    }

    let create_form = if can_create {
        format!(
            r#"<div id="req-create" class="card mb-3 d-none"><div class="card-body">
                <h6>สร้างใบเบิกใหม่</h6>
                <div class="row g-2">
                    <div class="col-md-3">
                        <label class="form-label small">แผนก</label>
                        <select id="req-dept" class="form-select form-select-sm">{dept_options}</select>
                    </div>
                    <div class="col-md-3">
                        <label class="form-label small">ผู้ขอเบิก</label>
                        <input id="req-requester" class="form-control form-control-sm" type="text">
                    </div>
                    <div class="col-md-3">
                        <label class="form-label small">อีเมล</label>
                        <input id="req-email" class="form-control form-control-sm" type="email">
                    </div>
                    <div class="col-md-3">
                        <label class="form-label small">หมายเหตุ</label>
                        <input id="req-remark" class="form-control form-control-sm" type="text">
                    </div>
                </div>
                <hr>
                <div class="row g-2 align-items-end">
                    <div class="col-md-4">
                        <label class="form-label small">รายการ</label>
                        <input id="req-line-item" class="form-control form-control-sm" list="req-items">
                        <datalist id="req-items">{item_options}</datalist>
                    </div>
                    <div class="col-md-2">
                        <label class="form-label small">จำนวน</label>
                        <input id="req-line-qty" class="form-control form-control-sm" type="number" min="0" step="any">
                    </div>
                    <div class="col-md-2">
                        <label class="form-label small">หน่วย</label>
                        <input id="req-line-uom" class="form-control form-control-sm" type="text">
                    </div>
                    <div class="col-md-3">
                        <label class="form-label small">หมายเหตุ</label>
                        <input id="req-line-remark" class="form-control form-control-sm" type="text">
                    </div>
                    <div class="col-md-1">
                        <button id="btn-req-add-line" class="btn btn-outline-primary btn-sm w-100">+</button>
                    </div>
                </div>
                <div id="req-lines" class="mt-2"></div>
                <div class="mt-3 d-flex align-items-center gap-2">
                    <button id="btn-req-save" class="btn btn-success btn-sm">บันทึกแบบร่าง</button>
                    <button id="btn-req-send" class="btn btn-primary btn-sm" disabled>ส่งใบเบิก</button>
                    <span id="req-create-status" class="small"></span>
                </div>
            </div></div>"#,
        )
    } else {
        String::new()
    };

    set_inner_html(
        host,
        &format!(
            r#"<div class="d-flex justify-content-between align-items-center mb-3">
                <h4 class="mb-0">ใบเบิก</h4>
                {create_btn}
            </div>
            {create_form}
            <div class="row g-2 mb-3">
                <div class="col-md-3">
                    <select id="req-filter-status" class="form-select form-select-sm">
                        <option value="">ทุกสถานะ</option>
                        <option value="DRAFT">DRAFT</option>
                        <option value="SUBMITTED">SUBMITTED</option>
                        <option value="ISSUED">ISSUED</option>
                    </select>
                </div>
                <div class="col-md-3">
                    <input id="req-filter-from" class="form-control form-control-sm" type="date">
                </div>
                <div class="col-md-3">
                    <input id="req-filter-to" class="form-control form-control-sm" type="date">
                </div>
                <div class="col-md-3">
                    <button id="btn-req-search" class="btn btn-outline-primary btn-sm w-100">ค้นหา</button>
                </div>
            </div>
            <table class="table table-sm table-hover">
                <thead><tr><th>เลขที่</th><th>สถานะ</th><th>แผนก</th><th>ผู้ขอเบิก</th><th>วันที่</th></tr></thead>
                <tbody id="req-tbody"></tbody>
            </table>"#,
        ),
    );

    let reload = {
        let ctx = ctx.clone();
        Rc::new(move || {
            let ctx = ctx.clone();
            spawn_local(async move {
                let mut filters = serde_json::Map::new();
                let status = select_value("req-filter-status");
                if !status.is_empty() {
                    filters.insert("status".to_string(), json!(status));
                }
                let from = input_value("req-filter-from");
                if !from.is_empty() {
                    filters.insert("dateFrom".to_string(), json!(from));
                }
                let to = input_value("req-filter-to");
                if !to.is_empty() {
                    filters.insert("dateTo".to_string(), json!(to));
                }

                let res = ctx.api.call("list_requisitions", Value::Object(filters)).await;
                let Some(tbody) = get_element_by_id("req-tbody") else {
                    return;
                };
                if !res.ok {
                    set_inner_html(
                        &tbody,
                        &format!(
                            r#"<tr><td colspan="5" class="text-danger small">{}</td></tr>"#,
                            escape_html(&res.error_text())
                        ),
                    );
                    return;
                }
                let rows: Vec<RequisitionSummary> =
                    pick_array(&res.data(), &["rows", "requisitions", "data"])
                        .iter()
                        .map(RequisitionSummary::from_value)
                        .collect();
                set_inner_html(&tbody, &summary_rows_html(&rows));
            });
        })
    };
    reload();

    if let Some(btn) = get_element_by_id("btn-req-search") {
        let reload = reload.clone();
        on_click(&btn, move |_| reload()).map_err(|e| format!("{:?}", e))?;
    }

    if can_create {
        wire_create_form(&ctx, reload).map_err(|e| format!("{:?}", e))?;
    }

    Ok(PageHandle::empty())
}

fn wire_create_form(ctx: &Rc<AppContext>, reload: Rc<dyn Fn()>) -> Result<(), wasm_bindgen::JsValue> {
    // estado del borrador: líneas agregadas y el req_id devuelto por el save
    let lines: Rc<RefCell<Vec<RequisitionLine>>> = Rc::new(RefCell::new(Vec::new()));
    let draft_id: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

    if let Some(btn) = get_element_by_id("btn-req-new") {
        on_click(&btn, move |_| {
            if let Some(panel) = get_element_by_id("req-create") {
                let _ = panel.class_list().toggle("d-none");
            }
        })?;
    }

    if let Some(btn) = get_element_by_id("btn-req-add-line") {
        let lines = lines.clone();
        on_click(&btn, move |_| {
            let line = RequisitionLine {
                item_code: input_value("req-line-item").trim().to_string(),
                qty: input_value("req-line-qty").trim().parse().unwrap_or(0.0),
                uom: input_value("req-line-uom").trim().to_string(),
                remark: input_value("req-line-remark").trim().to_string(),
            };
            if !line.is_valid() {
                set_create_status("กรุณากรอกรายการ จำนวน และหน่วยให้ครบ", true);
                return;
            }
            lines.borrow_mut().push(line);
            for id in ["req-line-item", "req-line-qty", "req-line-uom", "req-line-remark"] {
                set_input_value(id, "");
            }
            set_create_status("", false);
            render_draft_lines(&lines.borrow());
        })?;
    }

    if let Some(btn) = get_element_by_id("btn-req-save") {
        let ctx = ctx.clone();
        let lines = lines.clone();
        let draft_id = draft_id.clone();
        let reload = reload.clone();
        on_click(&btn, move |_| {
            let dept = select_value("req-dept");
            if dept.is_empty() {
                set_create_status("กรุณาเลือกแผนก", true);
                return;
            }
            let payload_lines: Vec<Value> = lines
                .borrow()
                .iter()
                .filter(|l| l.is_valid())
                .map(|l| {
                    json!({
                        "item_code": l.item_code,
                        "qty": l.qty,
                        "uom": l.uom,
                        "remark": l.remark,
                    })
                })
                .collect();
            if payload_lines.is_empty() {
                set_create_status("ต้องมีอย่างน้อย 1 รายการ", true);
                return;
            }

            let ctx = ctx.clone();
            let draft_id = draft_id.clone();
            let reload = reload.clone();
            set_create_status("กำลังบันทึก...", false);
            spawn_local(async move {
                let res = ctx
                    .api
                    .call(
                        "create_requisition",
                        json!({
                            "dept": dept,
                            "requester": input_value("req-requester").trim(),
                            "requester_email": input_value("req-email").trim(),
                            "remark": input_value("req-remark").trim(),
                            "lines": payload_lines,
                        }),
                    )
                    .await;
                if !res.ok {
                    set_create_status(&res.error_text(), true);
                    return;
                }
                let req_id = pick_str(&res.raw, &["req_id", "data.req_id", "data.reqId"])
                    .unwrap_or_default();
                *draft_id.borrow_mut() = Some(req_id.clone());
                set_create_status(&format!("บันทึกแบบร่าง {} แล้ว", req_id), false);
                show_toast("บันทึกแบบร่างสำเร็จ", true);
                if let Some(send) = get_element_by_id("btn-req-send") {
                    let _ = send.remove_attribute("disabled");
                }
                reload();
            });
        })?;
    }

    if let Some(btn) = get_element_by_id("btn-req-send") {
        let ctx = ctx.clone();
        let draft_id = draft_id.clone();
        let reload = reload.clone();
        on_click(&btn, move |_| {
            let Some(req_id) = draft_id.borrow().clone() else {
                set_create_status("ยังไม่ได้บันทึกแบบร่าง", true);
                return;
            };
            if !confirm("ยืนยันส่งใบเบิก? หลังส่งแล้วจะแก้ไขไม่ได้") {
                return;
            }
            let ctx = ctx.clone();
            let reload = reload.clone();
            spawn_local(async move {
                match submit_requisition(&ctx, &req_id).await {
                    Ok(_) => {
                        set_create_status("", false);
                        reload();
                    }
                    Err(msg) => set_create_status(&msg, true),
                }
            });
        })?;
    }

    Ok(())
}

fn render_draft_lines(lines: &[RequisitionLine]) {
    if let Some(host) = get_element_by_id("req-lines") {
        set_inner_html(&host, &lines_table_html(lines));
    }
}

fn set_create_status(text: &str, is_error: bool) {
    if let Some(el) = get_element_by_id("req-create-status") {
        el.set_class_name(if is_error { "small text-danger" } else { "small text-muted" });
        set_text_content(&el, text);
    }
}

fn status_badge(summary: &RequisitionSummary) -> String {
    let class = if summary.is_final() {
        "badge bg-success"
    } else {
        "badge bg-secondary"
    };
    format!(
        r#"<span class="{}">{}</span>"#,
        class,
        escape_html(&summary.status)
    )
}

fn summary_rows_html(rows: &[RequisitionSummary]) -> String {
    if rows.is_empty() {
        return r#"<tr><td colspan="5" class="text-center text-muted py-4">ไม่พบใบเบิก</td></tr>"#
            .to_string();
    }
    let mut html = String::new();
    for row in rows {
        html.push_str(&format!(
            r##"<tr>
                <td><a href="#/requisitions?id={id}">{id_text}</a></td>
                <td>{status}</td><td>{dept}</td><td>{requester}</td><td>{created}</td>
            </tr>"##,
            id = escape_html(&row.req_id),
            id_text = escape_html(&row.req_id),
            status = status_badge(row),
            dept = escape_html(&row.dept),
            requester = escape_html(&row.requester),
            created = escape_html(&fmt_datetime(Some(&row.created_at))),
        ));
    }
    html
}

fn lines_table_html(lines: &[RequisitionLine]) -> String {
    if lines.is_empty() {
        return r#"<div class="text-muted small">ยังไม่มีรายการ</div>"#.to_string();
    }
    let mut body = String::new();
    for (idx, line) in lines.iter().enumerate() {
        body.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td class="text-end">{}</td><td>{}</td><td>{}</td></tr>"#,
            idx + 1,
            escape_html(&line.item_code),
            fmt_number(Some(line.qty)),
            escape_html(&line.uom),
            escape_html(&line.remark),
        ));
    }
    format!(
        r#"<table class="table table-sm mb-0">
            <thead><tr><th>#</th><th>รายการ</th><th class="text-end">จำนวน</th><th>หน่วย</th><th>หมายเหตุ</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, status: &str) -> RequisitionSummary {
        RequisitionSummary::from_value(&json!({
            "req_id": id, "status": status, "dept": "OPD", "requester": "สมชาย",
            "created_at": "2026-08-01T10:00:00Z"
        }))
    }

    #[test]
    fn summary_rows_link_to_detail() {
        let html = summary_rows_html(&[summary("RQ-001", "DRAFT")]);
        assert!(html.contains("#/requisitions?id=RQ-001"));
        assert!(html.contains("bg-secondary"));
    }

    #[test]
    fn final_status_gets_green_badge() {
        let html = summary_rows_html(&[summary("RQ-002", "ISSUED")]);
        assert!(html.contains("bg-success"));
    }

    #[test]
    fn empty_list_shows_placeholder() {
        assert!(summary_rows_html(&[]).contains("ไม่พบใบเบิก"));
    }

    #[test]
    fn lines_table_numbers_rows() {
        let lines = vec![
            RequisitionLine { item_code: "A".into(), qty: 2.0, uom: "EA".into(), remark: "".into() },
            RequisitionLine { item_code: "B".into(), qty: 1.5, uom: "BOX".into(), remark: "ด่วน".into() },
        ];
        let html = lines_table_html(&lines);
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<td>2</td>"));
        assert!(html.contains("ด่วน"));
    }
}
