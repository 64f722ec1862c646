// ============================================================================
// SESSION MODELS - Rol y datos de la sesión activa
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rol del usuario autenticado. Gobierna menú y acceso a rutas (el backend
/// vuelve a validar; este gate es solo de frontend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Requester,
    Store,
    Admin,
}

impl Role {
    /// Parseo tolerante: el backend guarda el rol como string libre.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_uppercase().as_str() {
            "REQUESTER" => Some(Role::Requester),
            "STORE" => Some(Role::Store),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Requester => "REQUESTER",
            Role::Store => "STORE",
            Role::Admin => "ADMIN",
        }
    }
}

/// Datos persistidos al hacer login. El profile es opaco para el frontend
/// (solo se usa para mostrar el nombre).
#[derive(Debug, Clone)]
pub struct SessionData {
    pub endpoint_url: String,
    pub token: String,
    pub role: String,
    pub profile: Value,
}

/// Nombre presentable del usuario a partir del profile opaco.
pub fn profile_display_name(profile: &Value) -> String {
    crate::utils::pick_str(profile, &["name", "displayName", "username"])
        .unwrap_or_else(|| "ผู้ใช้".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" STORE "), Some(Role::Store));
        assert_eq!(Role::parse("requester"), Some(Role::Requester));
        assert_eq!(Role::parse("SUPERUSER"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn profile_name_fallbacks() {
        assert_eq!(
            profile_display_name(&json!({ "displayName": "A", "username": "b" })),
            "A"
        );
        assert_eq!(profile_display_name(&json!({ "username": "b" })), "b");
        assert_eq!(profile_display_name(&json!({})), "ผู้ใช้");
    }
}
