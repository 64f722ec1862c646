// ============================================================================
// SHELL - Navbar + menú lateral + contenedor de página
// ============================================================================
// Se re-renderiza en cada navegación (la app es chica y el DOM barato); el
// menú sale de la tabla RBAC, así que una ruta que no aparece en el menú
// tampoco pasa el guard del router.
// ============================================================================

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{escape_html, get_element_by_id, on_click, set_inner_html};
use crate::models::profile_display_name;
use crate::rbac::{permitted_routes, RouteKey};
use crate::services::session;
use crate::views::{app_root, PAGE_HOST_ID};

/// Monta el shell con `active` resaltado y devuelve el contenedor donde la
/// página dibuja su contenido.
pub fn render_shell(ctx: &Rc<AppContext>, active: RouteKey) -> Result<Element, JsValue> {
    let root = app_root().ok_or_else(|| JsValue::from_str("No existe #app en el documento"))?;

    let user_name = profile_display_name(&ctx.store.profile());
    let role_badge = ctx
        .store
        .role()
        .map(|r| r.as_str())
        .unwrap_or("-");

    let mut menu = String::new();
    if let Some(role) = ctx.store.role() {
        for route in permitted_routes(role) {
            let class = if *route == active {
                "nav-link active"
            } else {
                "nav-link"
            };
            menu.push_str(&format!(
                r##"<li class="nav-item"><a class="{}" href="#/{}">{}</a></li>"##,
                class,
                route.as_str(),
                route.menu_label()
            ));
        }
    }

    set_inner_html(
        &root,
        &format!(
            r#"<nav class="navbar navbar-dark bg-primary px-3">
                <span class="navbar-brand">🏥 ระบบคลังเวชภัณฑ์</span>
                <div class="d-flex align-items-center gap-2 text-white">
                    <span class="small">{user}</span>
                    <span class="badge bg-light text-primary">{role}</span>
                    <button id="btn-logout" class="btn btn-outline-light btn-sm">ออกจากระบบ</button>
                </div>
            </nav>
            <div class="d-flex">
                <aside class="sidebar border-end p-2">
                    <ul class="nav nav-pills flex-column">{menu}</ul>
                </aside>
                <main id="{host}" class="flex-grow-1 p-3"></main>
            </div>"#,
            user = escape_html(&user_name),
            role = role_badge,
            menu = menu,
            host = PAGE_HOST_ID,
        ),
    );

    if let Some(btn) = get_element_by_id("btn-logout") {
        let ctx = ctx.clone();
        on_click(&btn, move |_| {
            let ctx = ctx.clone();
            spawn_local(async move {
                session::logout(&ctx.api, &ctx.store).await;
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_hash(session::LOGIN_HASH);
                }
            });
        })?;
    }

    get_element_by_id(PAGE_HOST_ID)
        .ok_or_else(|| JsValue::from_str("No se pudo montar el contenedor de página"))
}
