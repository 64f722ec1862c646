// ============================================================================
// SESSION - Persistencia de sesión + login/logout/forced logout
// ============================================================================
// El SessionStore es el único dueño de las claves persistidas (URL, token,
// rol, profile). El gateway y el router lo reciben inyectado; nada lee
// localStorage por su cuenta.
// ============================================================================

use serde_json::{json, Value};
use std::rc::Rc;

use crate::config::CONFIG;
use crate::models::{Role, SessionData};
use crate::services::api::{ApiClient, ApiResponse, CallOptions};
use crate::utils::{load_json, pick, pick_str, save_json, KeyValueBackend};

pub const KEY_API_URL: &str = "API_URL";
pub const KEY_SESSION_TOKEN: &str = "sessionToken";
pub const KEY_ROLE: &str = "role";
pub const KEY_PROFILE: &str = "profile";

pub const LOGIN_HASH: &str = "#/login";

pub struct SessionStore {
    backend: Rc<dyn KeyValueBackend>,
}

impl SessionStore {
    pub fn new(backend: Rc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// URL efectiva: la guardada, o el default de compilación.
    pub fn api_url(&self) -> String {
        self.backend
            .get(KEY_API_URL)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| CONFIG.default_api_url.clone())
    }

    /// Solo la URL guardada (el login la usa para prellenar el campo).
    pub fn saved_api_url(&self) -> Option<String> {
        self.backend.get(KEY_API_URL).filter(|s| !s.is_empty())
    }

    pub fn token(&self) -> String {
        self.backend.get(KEY_SESSION_TOKEN).unwrap_or_default()
    }

    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.backend.get(KEY_ROLE)?)
    }

    pub fn profile(&self) -> Value {
        load_json(self.backend.as_ref(), KEY_PROFILE).unwrap_or_else(|| json!({}))
    }

    pub fn is_authed(&self) -> bool {
        !self.token().is_empty()
    }

    pub fn set_session(&self, session: &SessionData) {
        if !session.endpoint_url.is_empty() {
            let _ = self.backend.set(KEY_API_URL, &session.endpoint_url);
        }
        if !session.token.is_empty() {
            let _ = self.backend.set(KEY_SESSION_TOKEN, &session.token);
        }
        if !session.role.is_empty() {
            let _ = self.backend.set(KEY_ROLE, &session.role);
        }
        let _ = save_json(self.backend.as_ref(), KEY_PROFILE, &session.profile);
    }

    /// Idempotente: limpiar dos veces es inocuo, por eso las invocaciones
    /// concurrentes de force_logout no necesitan lock.
    pub fn clear(&self) {
        self.backend.remove(KEY_API_URL);
        self.backend.remove(KEY_SESSION_TOKEN);
        self.backend.remove(KEY_ROLE);
        self.backend.remove(KEY_PROFILE);
    }
}

/// Login contra el backend. Usa overrides porque todavía no hay sesión
/// guardada. En éxito persiste la sesión; en fallo devuelve la respuesta
/// del gateway sin tocar.
pub async fn login(
    api: &ApiClient,
    store: &SessionStore,
    username: &str,
    password: &str,
    api_url: &str,
) -> ApiResponse {
    let res = api
        .call_with(
            "auth_login",
            json!({ "username": username, "password": password }),
            CallOptions {
                endpoint_override: Some(api_url.to_string()),
                token_override: Some(String::new()),
                force_post: false,
            },
        )
        .await;

    if !res.ok {
        return res;
    }

    let token = pick_str(&res.raw, &["sessionToken", "data.sessionToken"]).unwrap_or_default();
    let role = pick_str(&res.raw, &["role", "data.role"]).unwrap_or_default();
    let profile = pick(&res.raw, &["profile", "data.profile"])
        .cloned()
        .unwrap_or_else(|| json!({}));

    store.set_session(&SessionData {
        endpoint_url: api_url.to_string(),
        token,
        role: role.clone(),
        profile,
    });
    log::info!("✅ [SESSION] Login correcto, rol: {}", role);

    res
}

/// Logout best-effort: avisa al backend y limpia local pase lo que pase.
pub async fn logout(api: &ApiClient, store: &SessionStore) {
    let res = api.call("auth_logout", json!({})).await;
    if !res.ok {
        log::warn!("⚠️ [SESSION] auth_logout falló ({:?}), limpiando igual", res.error_code);
    }
    store.clear();
}

/// Logout forzado por sesión inválida. Limpia siempre; navega a login solo
/// si no estamos ya ahí (evita bucles de redirect cuando varias llamadas
/// concurrentes detectan la invalidez a la vez).
pub fn force_logout(store: &SessionStore) {
    store.clear();

    if let Some(window) = web_sys::window() {
        let location = window.location();
        let hash = location.hash().unwrap_or_default();
        if !hash.starts_with(LOGIN_HASH) {
            let _ = location.set_hash(LOGIN_HASH);
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::utils::MemoryBackend;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    // force_logout solo toca location cuando el hash todavía no apunta a
    // login: varias detecciones concurrentes de sesión inválida producen un
    // único redirect.
    #[wasm_bindgen_test]
    fn force_logout_redirects_once_and_respects_login_hash() {
        let store = SessionStore::new(Rc::new(MemoryBackend::new()));
        store.set_session(&SessionData {
            endpoint_url: "https://api.example/exec".to_string(),
            token: "tok".to_string(),
            role: "ADMIN".to_string(),
            profile: json!({}),
        });

        let location = web_sys::window().unwrap().location();
        let _ = location.set_hash("#/stock");
        force_logout(&store);
        assert!(!store.is_authed());
        assert_eq!(location.hash().unwrap(), LOGIN_HASH);

        // ya en login (con query incluida): una segunda invocación limpia
        // pero no reescribe el hash
        let _ = location.set_hash("#/login?next=stock");
        force_logout(&store);
        assert_eq!(location.hash().unwrap(), "#/login?next=stock");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryBackend;

    fn store() -> SessionStore {
        SessionStore::new(Rc::new(MemoryBackend::new()))
    }

    #[test]
    fn session_roundtrip() {
        let store = store();
        assert!(!store.is_authed());

        store.set_session(&SessionData {
            endpoint_url: "https://api.example/exec".to_string(),
            token: "tok123".to_string(),
            role: "STORE".to_string(),
            profile: json!({ "name": "สมชาย" }),
        });

        assert!(store.is_authed());
        assert_eq!(store.api_url(), "https://api.example/exec");
        assert_eq!(store.token(), "tok123");
        assert_eq!(store.role(), Some(Role::Store));
        assert_eq!(store.profile()["name"], json!("สมชาย"));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = store();
        store.set_session(&SessionData {
            endpoint_url: "u".to_string(),
            token: "t".to_string(),
            role: "ADMIN".to_string(),
            profile: json!({}),
        });
        store.clear();
        store.clear();
        assert!(!store.is_authed());
        assert_eq!(store.role(), None);
    }

    #[test]
    fn set_session_skips_empty_fields() {
        let store = store();
        store.set_session(&SessionData {
            endpoint_url: "u1".to_string(),
            token: "t1".to_string(),
            role: "ADMIN".to_string(),
            profile: json!({}),
        });
        // un segundo login sin rol no debe borrar el rol anterior
        store.set_session(&SessionData {
            endpoint_url: String::new(),
            token: "t2".to_string(),
            role: String::new(),
            profile: json!({}),
        });
        assert_eq!(store.api_url(), "u1");
        assert_eq!(store.token(), "t2");
        assert_eq!(store.role(), Some(Role::Admin));
    }

    #[test]
    fn corrupt_profile_degrades_to_empty_object() {
        let store = store();
        let backend = MemoryBackend::new();
        backend.set(KEY_PROFILE, "{broken").unwrap();
        let store2 = SessionStore::new(Rc::new(backend));
        assert_eq!(store2.profile(), json!({}));
        assert_eq!(store.profile(), json!({}));
    }
}
