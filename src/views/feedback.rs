// ============================================================================
// FEEDBACK - Banners de error, skeletons, toasts y confirmación
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::{escape_html, get_element_by_id, on_click, set_inner_html, ElementBuilder};

/// Banner de error a pantalla de página, con botón de reintento opcional.
pub fn render_error_banner(
    host: &Element,
    message: &str,
    retry: Option<Box<dyn FnOnce()>>,
) -> Result<(), JsValue> {
    let retry_btn = if retry.is_some() {
        r#"<button id="btn-retry" class="btn btn-outline-danger btn-sm mt-2">ลองใหม่</button>"#
    } else {
        ""
    };
    set_inner_html(
        host,
        &format!(
            r#"<div class="alert alert-danger" role="alert">
                <div class="fw-bold">เกิดข้อผิดพลาด</div>
                <div class="small">{}</div>
                {}
            </div>"#,
            escape_html(message),
            retry_btn
        ),
    );

    if let Some(retry) = retry {
        if let Some(btn) = get_element_by_id("btn-retry") {
            let retry = Rc::new(RefCell::new(Some(retry)));
            on_click(&btn, move |_| {
                if let Some(f) = retry.borrow_mut().take() {
                    f();
                }
            })?;
        }
    }
    Ok(())
}

/// Aviso de ruta sin permiso, con vuelta al dashboard.
pub fn render_access_denied(host: &Element, route_label: &str) -> Result<(), JsValue> {
    set_inner_html(host, &access_denied_html(route_label));
    Ok(())
}

fn access_denied_html(route_label: &str) -> String {
    format!(
        r##"<div class="alert alert-warning" role="alert">
            <div class="fw-bold">🔒 ไม่มีสิทธิ์เข้าถึง</div>
            <div class="small">บัญชีของคุณไม่มีสิทธิ์ใช้งานหน้า "{}"</div>
            <a href="#/dashboard" class="btn btn-outline-secondary btn-sm mt-2">กลับแดชบอร์ด</a>
        </div>"##,
        escape_html(route_label)
    )
}

/// Placeholder animado mientras llega la data.
pub fn render_skeleton(host: &Element, lines: usize) {
    let mut html = String::from(r#"<div class="placeholder-glow py-3">"#);
    for _ in 0..lines {
        html.push_str(r#"<div class="placeholder col-12 mb-2" style="height:1.5rem"></div>"#);
    }
    html.push_str("</div>");
    set_inner_html(host, &html);
}

/// Toast flotante que se autodestruye a los 3 segundos.
pub fn show_toast(message: &str, ok: bool) {
    let class = if ok {
        "app-toast bg-success text-white"
    } else {
        "app-toast bg-danger text-white"
    };
    let Ok(builder) = ElementBuilder::new("div") else {
        return;
    };
    let toast = builder.class(class).text(message).build();

    let Some(body) = crate::dom::document().and_then(|d| d.body()) else {
        return;
    };
    if body.append_child(&toast).is_err() {
        return;
    }

    gloo_timers::callback::Timeout::new(3_000, move || {
        toast.remove();
    })
    .forget();
}

/// Diálogo de confirmación nativo del navegador.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_links_back_to_dashboard() {
        let html = access_denied_html("จัดการข้อมูลหลัก");
        assert!(html.contains(r##"href="#/dashboard""##));
        assert!(html.contains("จัดการข้อมูลหลัก"));
    }

    #[test]
    fn access_denied_escapes_label() {
        let html = access_denied_html("<script>x</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
