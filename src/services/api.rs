// ============================================================================
// API GATEWAY - Comunicación con el endpoint JSON (acción + payload)
// ============================================================================
// Todas las llamadas al backend pasan por aquí. El gateway decide transporte
// (GET para lecturas permitidas, POST para todo lo demás), normaliza la
// respuesta (ok/success, timestamps snake_case) y detecta sesiones inválidas.
// Los fallos esperados (red, JSON corrupto, sesión) se devuelven SIEMPRE como
// ApiResponse, nunca como panic ni Err.
// ============================================================================

use gloo_net::http::Request;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

use crate::services::session::SessionStore;

/// Acciones de solo-lectura que pueden viajar como GET (querystring).
/// Cualquier otra acción, o force_post, usa POST.
pub const READ_ACTIONS: [&str; 9] = [
    "health",
    "dashboard_snapshot",
    "get_stock_summary",
    "get_stock_summary_all",
    "list_items",
    "list_vendors",
    "list_warehouses",
    "list_requisitions",
    "get_requisition_detail",
];

pub const ERR_NO_ENDPOINT: &str = "NO_ENDPOINT";
pub const ERR_NETWORK: &str = "NETWORK_ERROR";
pub const ERR_INVALID_JSON: &str = "INVALID_JSON";
pub const ERR_SESSION_INVALID: &str = "SESSION_INVALID";

// Restricción del backend: no consume application/json, el body JSON viaja
// como texto plano.
const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Códigos estructurados que significan sesión inválida (match exacto, sin caso)
const INVALID_SESSION_CODES: [&str; 5] = [
    "INVALID_TOKEN",
    "SESSION_EXPIRED",
    "UNAUTHORIZED",
    "AUTH_REQUIRED",
    "TOKEN_INVALID",
];

/// Pistas por substring en el mensaje. Contrato heredado del backend: puede
/// dar falsos positivos (un mensaje de negocio que contenga "TOKEN" fuerza
/// logout). Ver DESIGN.md.
const INVALID_SESSION_HINTS: [&str; 5] = ["INVALID", "EXPIRED", "UNAUTHORIZED", "TOKEN", "SESSION"];

/// Pares snake_case -> camelCase que el backend devuelve inconsistentemente.
const TIMESTAMP_ALIASES: [(&str, &str); 4] = [
    ("last_sync_time", "lastSyncTime"),
    ("last_updated", "lastUpdated"),
    ("created_at", "createdAt"),
    ("updated_at", "updatedAt"),
];

#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// URL a usar antes de que exista sesión (login / test connection)
    pub endpoint_override: Option<String>,
    /// Token a usar en lugar del guardado (login usa cadena vacía)
    pub token_override: Option<String>,
    /// Fuerza POST aunque la acción esté en la allow-list de lecturas
    pub force_post: bool,
}

/// Respuesta normalizada del backend. `raw` conserva el payload completo
/// (ya normalizado) para los campos específicos de cada acción.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub ok: bool,
    pub error_code: Option<String>,
    pub message: Option<String>,
    pub http_status: Option<u16>,
    pub raw: Value,
}

impl ApiResponse {
    pub fn failure(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            error_code: Some(code.to_string()),
            message: Some(message.to_string()),
            http_status: None,
            raw: json!({
                "ok": false,
                "success": false,
                "errorCode": code,
                "message": message,
            }),
        }
    }

    fn failure_with(code: &str, message: &str, details: Value, http_status: Option<u16>) -> Self {
        let mut res = Self::failure(code, message);
        res.http_status = http_status;
        if let Value::Object(map) = &mut res.raw {
            map.insert("details".to_string(), details);
            if let Some(status) = http_status {
                map.insert("httpStatus".to_string(), json!(status));
            }
        }
        res
    }

    /// Construye la respuesta desde el JSON del backend, aplicando la
    /// normalización (único sitio donde vive el aliasing ok/success).
    pub fn from_value(mut value: Value, http_status: Option<u16>) -> Self {
        let ok = normalize_response(&mut value);
        if let (Value::Object(map), Some(status)) = (&mut value, http_status) {
            map.insert("httpStatus".to_string(), json!(status));
        }
        Self {
            ok,
            error_code: crate::utils::pick_str(&value, &["errorCode", "code"]),
            message: crate::utils::pick_str(&value, &["message", "error"]),
            http_status,
            raw: value,
        }
    }

    /// Payload de datos: `data` si el backend lo anidó, si no el objeto raíz.
    pub fn data(&self) -> &Value {
        match self.raw.get("data") {
            Some(d) if !d.is_null() => d,
            _ => &self.raw,
        }
    }

    /// Texto de error presentable para banners/toasts.
    pub fn error_text(&self) -> String {
        format_error(&self.raw)
    }
}

/// Sincroniza ok/success y espeja timestamps snake_case a camelCase.
/// Devuelve el flag ok resultante.
pub fn normalize_response(value: &mut Value) -> bool {
    let ok = value
        .get("ok")
        .and_then(Value::as_bool)
        .or_else(|| value.get("success").and_then(Value::as_bool))
        .unwrap_or(false);

    if let Value::Object(map) = value {
        map.insert("ok".to_string(), Value::Bool(ok));
        map.insert("success".to_string(), Value::Bool(ok));
        mirror_timestamps(map);
        if let Some(Value::Object(data)) = map.get_mut("data") {
            mirror_timestamps(data);
        }
    }
    ok
}

fn mirror_timestamps(map: &mut Map<String, Value>) {
    for (snake, camel) in TIMESTAMP_ALIASES {
        if !map.contains_key(camel) {
            if let Some(v) = map.get(snake).cloned() {
                map.insert(camel.to_string(), v);
            }
        }
    }
}

/// Detecta respuestas de sesión inválida: código estructurado exacto o
/// substring en el mensaje (ambos sin distinguir mayúsculas).
pub fn is_session_invalid(value: &Value) -> bool {
    let code = crate::utils::pick_str(value, &["errorCode", "code"])
        .unwrap_or_default()
        .to_uppercase();
    if INVALID_SESSION_CODES.contains(&code.as_str()) {
        return true;
    }

    let msg = crate::utils::pick_str(value, &["message", "error"])
        .unwrap_or_default()
        .to_uppercase();
    !msg.is_empty() && INVALID_SESSION_HINTS.iter().any(|h| msg.contains(h))
}

/// Mensaje de error legible a partir de cualquier payload del backend.
pub fn format_error(value: &Value) -> String {
    if let Some(s) = value.as_str() {
        return s.to_string();
    }
    let code = crate::utils::pick_str(value, &["errorCode", "code", "name"]);
    let msg = crate::utils::pick_str(value, &["message", "error", "msg"]);
    match (code, msg) {
        (Some(c), Some(m)) => format!("[{}] {}", c, m),
        (None, Some(m)) => m,
        _ => value.to_string(),
    }
}

/// true si la acción viaja como GET.
pub fn uses_get(action: &str, force_post: bool) -> bool {
    !force_post && READ_ACTIONS.contains(&action)
}

/// Cliente del gateway. El hook de sesión inválida se inyecta desde la app
/// (va a session::force_logout); el gateway en sí no navega.
pub struct ApiClient {
    store: Rc<SessionStore>,
    on_session_invalid: RefCell<Option<Rc<dyn Fn()>>>,
}

impl ApiClient {
    pub fn new(store: Rc<SessionStore>) -> Self {
        Self {
            store,
            on_session_invalid: RefCell::new(None),
        }
    }

    pub fn set_session_invalid_hook<F: Fn() + 'static>(&self, hook: F) {
        *self.on_session_invalid.borrow_mut() = Some(Rc::new(hook));
    }

    pub async fn call(&self, action: &str, data: Value) -> ApiResponse {
        self.call_with(action, data, CallOptions::default()).await
    }

    pub async fn call_with(&self, action: &str, data: Value, opts: CallOptions) -> ApiResponse {
        let endpoint = opts
            .endpoint_override
            .clone()
            .unwrap_or_else(|| self.store.api_url())
            .trim()
            .to_string();
        let token = opts
            .token_override
            .clone()
            .unwrap_or_else(|| self.store.token())
            .trim()
            .to_string();

        if endpoint.is_empty() {
            return ApiResponse::failure(
                ERR_NO_ENDPOINT,
                "กรุณาระบุ API URL ก่อนเรียกใช้งานระบบ",
            );
        }

        let data_json = data.to_string();
        log::debug!("🌐 [API] {} -> {}", action, endpoint);

        let sent = if uses_get(action, opts.force_post) {
            Request::get(&endpoint)
                .query([
                    ("action", action),
                    ("sessionToken", token.as_str()),
                    ("data", data_json.as_str()),
                ])
                .send()
                .await
        } else {
            let payload = json!({
                "action": action,
                "data": data,
                "sessionToken": token,
            });
            match Request::post(&endpoint)
                .header("Content-Type", POST_CONTENT_TYPE)
                .body(payload.to_string())
            {
                Ok(req) => req.send().await,
                Err(e) => {
                    log::error!("❌ [API] Error construyendo request {}: {}", action, e);
                    return ApiResponse::failure_with(
                        ERR_NETWORK,
                        "เชื่อมต่อไม่ได้ โปรดตรวจสอบเครือข่าย/URL",
                        json!(e.to_string()),
                        None,
                    );
                }
            }
        };

        let response = match sent {
            Ok(r) => r,
            Err(e) => {
                log::warn!("⚠️ [API] Error de red en {}: {}", action, e);
                return ApiResponse::failure_with(
                    ERR_NETWORK,
                    "เชื่อมต่อไม่ได้ โปรดตรวจสอบเครือข่าย/URL",
                    json!(e.to_string()),
                    None,
                );
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                log::warn!("⚠️ [API] Error leyendo body de {}: {}", action, e);
                return ApiResponse::failure_with(
                    ERR_NETWORK,
                    "เชื่อมต่อไม่ได้ โปรดตรวจสอบเครือข่าย/URL",
                    json!(e.to_string()),
                    Some(status),
                );
            }
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) => {
                // Conservar un fragmento del body crudo para diagnóstico
                let snippet: String = text.chars().take(500).collect();
                log::warn!("⚠️ [API] Respuesta no-JSON en {} (HTTP {})", action, status);
                return ApiResponse::failure_with(
                    ERR_INVALID_JSON,
                    "รูปแบบข้อมูลตอบกลับไม่ถูกต้อง (ไม่ใช่ JSON)",
                    json!(snippet),
                    Some(status),
                );
            }
        };

        let result = ApiResponse::from_value(value, Some(status));

        if !result.ok && is_session_invalid(&result.raw) {
            log::warn!("🔒 [API] Sesión inválida detectada en {}, forzando logout", action);
            if let Some(hook) = self.on_session_invalid.borrow().clone() {
                hook();
            }
            let mut forced = ApiResponse::failure(
                ERR_SESSION_INVALID,
                "เซสชันหมดอายุ กรุณาเข้าสู่ระบบใหม่",
            );
            forced.http_status = Some(status);
            return forced;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_actions_use_get_everything_else_posts() {
        for action in READ_ACTIONS {
            assert!(uses_get(action, false), "{} debería ir por GET", action);
        }
        for action in ["auth_login", "create_issue", "upsert_item", "refresh_dashboard"] {
            assert!(!uses_get(action, false), "{} debería ir por POST", action);
        }
        // force_post gana siempre, sin importar el payload
        assert!(!uses_get("get_stock_summary", true));
    }

    #[test]
    fn normalize_synthesizes_ok_from_success() {
        let mut v = json!({ "success": true, "data": {} });
        assert!(normalize_response(&mut v));
        assert_eq!(v["ok"], json!(true));
        assert_eq!(v["success"], json!(true));

        let mut v = json!({ "ok": false });
        assert!(!normalize_response(&mut v));
        assert_eq!(v["success"], json!(false));
    }

    #[test]
    fn normalize_defaults_to_not_ok() {
        let mut v = json!({ "message": "hola" });
        assert!(!normalize_response(&mut v));
        assert_eq!(v["ok"], json!(false));
    }

    #[test]
    fn normalize_mirrors_snake_case_timestamps() {
        let mut v = json!({
            "ok": true,
            "last_sync_time": "2024-01-01T00:00:00Z",
            "data": { "last_updated": "2024-02-02T00:00:00Z", "lastSyncTime": "keep" }
        });
        normalize_response(&mut v);
        assert_eq!(v["lastSyncTime"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(v["data"]["lastUpdated"], json!("2024-02-02T00:00:00Z"));
        // no pisa un camelCase ya presente
        assert_eq!(v["data"]["lastSyncTime"], json!("keep"));
    }

    #[test]
    fn session_invalid_matches_codes_case_insensitive() {
        assert!(is_session_invalid(&json!({ "errorCode": "SESSION_EXPIRED" })));
        assert!(is_session_invalid(&json!({ "code": "session_expired" })));
        assert!(is_session_invalid(&json!({ "errorCode": "Invalid_Token" })));
        assert!(!is_session_invalid(&json!({ "errorCode": "INSUFFICIENT_STOCK" })));
    }

    #[test]
    fn session_invalid_matches_message_substrings() {
        // Contrato heredado: substring matching sobre el mensaje
        assert!(is_session_invalid(&json!({ "message": "your token was rejected" })));
        assert!(is_session_invalid(&json!({ "error": "Session not found" })));
        assert!(!is_session_invalid(&json!({ "message": "stock bajo" })));
        assert!(!is_session_invalid(&json!({})));
    }

    #[test]
    fn from_value_extracts_error_fields() {
        let res = ApiResponse::from_value(
            json!({ "success": false, "code": "INSUFFICIENT_STOCK", "error": "no hay" }),
            Some(200),
        );
        assert!(!res.ok);
        assert_eq!(res.error_code.as_deref(), Some("INSUFFICIENT_STOCK"));
        assert_eq!(res.message.as_deref(), Some("no hay"));
        assert_eq!(res.http_status, Some(200));
        assert_eq!(res.raw["httpStatus"], json!(200));
    }

    #[test]
    fn data_falls_back_to_root() {
        let nested = ApiResponse::from_value(json!({ "ok": true, "data": { "rows": [] } }), None);
        assert!(nested.data().get("rows").is_some());
        let flat = ApiResponse::from_value(json!({ "ok": true, "rows": [] }), None);
        assert!(flat.data().get("rows").is_some());
    }

    #[test]
    fn format_error_prefers_code_and_message() {
        assert_eq!(
            format_error(&json!({ "errorCode": "X", "message": "boom" })),
            "[X] boom"
        );
        assert_eq!(format_error(&json!({ "error": "boom" })), "boom");
        assert_eq!(format_error(&json!("texto")), "texto");
    }
}
