// ============================================================================
// LOGIN - Pantalla de entrada (sin shell)
// ============================================================================
// El campo de endpoint se oculta cuando el build fija LOCK_API_URL y existe
// una URL resoluble; en despliegues de prueba queda visible para apuntar a
// cualquier backend.
// ============================================================================

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::app::AppContext;
use crate::config::CONFIG;
use crate::dom::{escape_html, get_element_by_id, input_value, on_click, set_inner_html, set_text_content};
use crate::router::PageHandle;
use crate::services::api::CallOptions;
use crate::services::session;
use crate::views::feedback::show_toast;

pub fn render(ctx: Rc<AppContext>, root: &Element) -> Result<PageHandle, JsValue> {
    let effective_url = ctx.store.api_url();
    let endpoint_locked = CONFIG.lock_api_url && !effective_url.is_empty();

    let endpoint_field = if endpoint_locked {
        String::new()
    } else {
        format!(
            r#"<div class="mb-3">
                <label class="form-label">API URL</label>
                <input id="login-api-url" class="form-control" type="url" value="{}"
                       placeholder="https://script.google.com/.../exec">
            </div>"#,
            escape_html(&effective_url)
        )
    };

    set_inner_html(
        root,
        &format!(
            r#"<div class="login-wrap d-flex justify-content-center align-items-center min-vh-100">
                <div class="card shadow" style="width: 24rem">
                    <div class="card-body">
                        <h5 class="card-title text-center mb-3">🏥 ระบบคลังเวชภัณฑ์</h5>
                        {endpoint_field}
                        <div class="mb-3">
                            <label class="form-label">ชื่อผู้ใช้</label>
                            <input id="login-username" class="form-control" type="text" autocomplete="username">
                        </div>
                        <div class="mb-3">
                            <label class="form-label">รหัสผ่าน</label>
                            <input id="login-password" class="form-control" type="password" autocomplete="current-password">
                        </div>
                        <div class="d-grid gap-2">
                            <button id="btn-login" class="btn btn-primary">เข้าสู่ระบบ</button>
                            <button id="btn-test-conn" class="btn btn-outline-secondary btn-sm">ทดสอบการเชื่อมต่อ</button>
                        </div>
                        <div id="login-status" class="small text-center mt-3"></div>
                    </div>
                </div>
            </div>"#,
        ),
    );

    let resolve_url = move |ctx: &AppContext| -> String {
        if endpoint_locked {
            ctx.store.api_url()
        } else {
            let typed = input_value("login-api-url");
            let typed = typed.trim().to_string();
            if typed.is_empty() {
                ctx.store.api_url()
            } else {
                typed
            }
        }
    };

    if let Some(btn) = get_element_by_id("btn-test-conn") {
        let ctx = ctx.clone();
        on_click(&btn, move |_| {
            let ctx = ctx.clone();
            let url = resolve_url(&ctx);
            set_status("กำลังทดสอบ...", false);
            spawn_local(async move {
                let res = ctx
                    .api
                    .call_with(
                        "health",
                        serde_json::json!({}),
                        CallOptions {
                            endpoint_override: Some(url),
                            token_override: Some(String::new()),
                            force_post: false,
                        },
                    )
                    .await;
                if res.ok {
                    set_status("✅ เชื่อมต่อสำเร็จ", false);
                } else {
                    set_status(&format!("❌ {}", res.error_text()), true);
                }
            });
        })?;
    }

    if let Some(btn) = get_element_by_id("btn-login") {
        let ctx = ctx.clone();
        on_click(&btn, move |_| {
            let ctx = ctx.clone();
            let username = input_value("login-username").trim().to_string();
            let password = input_value("login-password");
            let url = resolve_url(&ctx);

            if username.is_empty() || password.is_empty() {
                set_status("กรุณากรอกชื่อผู้ใช้และรหัสผ่าน", true);
                return;
            }
            if url.is_empty() {
                set_status("กรุณาระบุ API URL", true);
                return;
            }

            set_status("กำลังเข้าสู่ระบบ...", false);
            spawn_local(async move {
                let res = session::login(&ctx.api, &ctx.store, &username, &password, &url).await;
                if res.ok {
                    show_toast("เข้าสู่ระบบสำเร็จ", true);
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_hash("#/dashboard");
                    }
                } else {
                    set_status(&res.error_text(), true);
                }
            });
        })?;
    }

    Ok(PageHandle::empty())
}

fn set_status(text: &str, is_error: bool) {
    if let Some(el) = get_element_by_id("login-status") {
        el.set_class_name(if is_error {
            "small text-center mt-3 text-danger"
        } else {
            "small text-center mt-3 text-muted"
        });
        set_text_content(&el, text);
    }
}
