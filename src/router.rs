// ============================================================================
// ROUTER - Navegación por hash con ciclo de vida de página
// ============================================================================
// Una sola suscripción a hashchange para toda la vida de la app. Cada
// navegación limpia la página anterior (timers, flags) antes de montar la
// nueva, y lleva un número de secuencia: si el usuario navega mientras una
// página todavía está cargando, el resultado tardío se descarta.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::rbac::{self, RouteKey};
use crate::services::session::LOGIN_HASH;
use crate::views;

/// Parámetros del query string del hash (#/requisitions?id=RQ-001).
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Lo que una página deja montado y hay que deshacer al salir.
pub struct PageHandle {
    pub cleanup: Option<Box<dyn FnOnce()>>,
}

impl PageHandle {
    pub fn empty() -> Self {
        Self { cleanup: None }
    }

    pub fn with_cleanup<F: FnOnce() + 'static>(f: F) -> Self {
        Self {
            cleanup: Some(Box::new(f)),
        }
    }

    fn run_cleanup(mut self) {
        if let Some(f) = self.cleanup.take() {
            f();
        }
    }
}

/// "#/stock?q=para" -> ("stock", [("q", "para")]). Tolerante a hashes sin
/// "#/" y a pares sin "=".
pub fn parse_hash(hash: &str) -> (String, RouteParams) {
    let h = hash.trim();
    let h = h.strip_prefix('#').unwrap_or(h);
    let h = h.strip_prefix('/').unwrap_or(h);
    let (path, query) = match h.split_once('?') {
        Some((p, q)) => (p, q),
        None => (h, ""),
    };
    let mut params = Vec::new();
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        params.push((percent_decode(k), percent_decode(v)));
    }
    (path.trim().to_string(), RouteParams(params))
}

/// Decodificador %XX mínimo (los valores vienen de set_hash propio, no de
/// input arbitrario). '+' cuenta como espacio.
fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub struct Router {
    ctx: Rc<AppContext>,
    current: RefCell<Option<PageHandle>>,
    nav_seq: Cell<u64>,
    hooked: Cell<bool>,
}

impl Router {
    pub fn new(ctx: Rc<AppContext>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            current: RefCell::new(None),
            nav_seq: Cell::new(0),
            hooked: Cell::new(false),
        })
    }

    /// Registra hashchange (una sola vez) y resuelve la ruta inicial.
    pub fn start(self: &Rc<Self>) -> Result<(), JsValue> {
        if !self.hooked.replace(true) {
            let router = self.clone();
            let closure = Closure::wrap(Box::new(move || {
                let router = router.clone();
                spawn_local(async move {
                    router.navigate().await;
                });
            }) as Box<dyn FnMut()>);
            let window =
                web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
            window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let router = self.clone();
        spawn_local(async move {
            router.navigate().await;
        });
        Ok(())
    }

    fn set_hash(&self, hash: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_hash(hash);
        }
    }

    fn current_hash(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }

    fn default_hash(&self) -> &'static str {
        if self.ctx.store.is_authed() {
            "#/dashboard"
        } else {
            LOGIN_HASH
        }
    }

    pub async fn navigate(self: Rc<Self>) {
        let seq = self.nav_seq.get() + 1;
        self.nav_seq.set(seq);

        // la página saliente libera sus timers antes de montar nada nuevo
        if let Some(prev) = self.current.borrow_mut().take() {
            prev.run_cleanup();
        }

        let (key, params) = parse_hash(&self.current_hash());
        if key.is_empty() {
            self.set_hash(self.default_hash());
            return;
        }

        let route = match RouteKey::parse(&key) {
            Some(r) => r,
            None => {
                log::warn!("⚠️ [ROUTER] Ruta desconocida '{}', redirigiendo a login", key);
                self.set_hash(LOGIN_HASH);
                return;
            }
        };

        // guard de autenticación: todo menos login exige token
        if route != RouteKey::Login && !self.ctx.store.is_authed() {
            self.set_hash(LOGIN_HASH);
            return;
        }

        log::info!("🧭 [ROUTER] Navegando a {}", route.as_str());

        let result = if route == RouteKey::Login {
            self.render_login().await
        } else if !rbac::is_permitted(self.ctx.store.role(), route) {
            self.render_denied(route)
        } else {
            self.render_page(route, &params).await
        };

        // navegación más nueva en curso: este resultado ya no interesa
        if self.nav_seq.get() != seq {
            if let Ok(handle) = result {
                handle.run_cleanup();
            }
            return;
        }

        match result {
            Ok(handle) => {
                *self.current.borrow_mut() = Some(handle);
            }
            Err(msg) => {
                log::error!("❌ [ROUTER] Error montando {}: {}", route.as_str(), msg);
                self.clone().render_failure(&msg);
            }
        }
    }

    async fn render_login(&self) -> Result<PageHandle, String> {
        let root = views::app_root().ok_or("No existe #app en el documento")?;
        views::login::render(self.ctx.clone(), &root).map_err(|e| format!("{:?}", e))
    }

    fn render_denied(&self, route: RouteKey) -> Result<PageHandle, String> {
        let host = views::shell::render_shell(&self.ctx, RouteKey::Dashboard)
            .map_err(|e| format!("{:?}", e))?;
        views::feedback::render_access_denied(&host, route.menu_label())
            .map_err(|e| format!("{:?}", e))?;
        Ok(PageHandle::empty())
    }

    async fn render_page(&self, route: RouteKey, params: &RouteParams) -> Result<PageHandle, String> {
        let host = views::shell::render_shell(&self.ctx, route).map_err(|e| format!("{:?}", e))?;
        let ctx = self.ctx.clone();
        match route {
            RouteKey::Login => unreachable!("login se monta sin shell"),
            RouteKey::Dashboard => views::dashboard::render(ctx, &host).await,
            RouteKey::Stock => views::stock::render(ctx, &host).await,
            RouteKey::Receive => views::receive::render(ctx, &host).await,
            RouteKey::Issue => views::issue::render(ctx, &host).await,
            RouteKey::Transactions => views::transactions::render(ctx, &host),
            RouteKey::Requisitions => views::requisitions::render(ctx, &host, params).await,
            RouteKey::Admin => views::admin::render(ctx, &host).await,
        }
    }

    fn render_failure(self: Rc<Self>, msg: &str) {
        if let Some(host) = views::page_host() {
            let router = self.clone();
            let _ = views::feedback::render_error_banner(
                &host,
                msg,
                Some(Box::new(move || {
                    let router = router.clone();
                    spawn_local(async move {
                        router.navigate().await;
                    });
                })),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_route() {
        let (key, params) = parse_hash("#/dashboard");
        assert_eq!(key, "dashboard");
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn parses_query_params() {
        let (key, params) = parse_hash("#/requisitions?id=RQ-001&tab=detail");
        assert_eq!(key, "requisitions");
        assert_eq!(params.get("id"), Some("RQ-001"));
        assert_eq!(params.get("tab"), Some("detail"));
    }

    #[test]
    fn empty_hash_yields_empty_key() {
        assert_eq!(parse_hash("").0, "");
        assert_eq!(parse_hash("#/").0, "");
        assert_eq!(parse_hash("#").0, "");
    }

    #[test]
    fn tolerates_pair_without_value() {
        let (_, params) = parse_hash("#/stock?low&wh=W1");
        assert_eq!(params.get("low"), Some(""));
        assert_eq!(params.get("wh"), Some("W1"));
    }

    #[test]
    fn decodes_percent_sequences() {
        let (_, params) = parse_hash("#/stock?q=%E0%B8%A2%E0%B8%B2+A%20B");
        assert_eq!(params.get("q"), Some("ยา A B"));
    }

    #[test]
    fn malformed_percent_passes_through() {
        let (_, params) = parse_hash("#/stock?q=100%");
        assert_eq!(params.get("q"), Some("100%"));
    }
}
