// ============================================================================
// RBAC - Tabla de permisos por rol y rutas conocidas
// ============================================================================
// Tabla explícita y default-deny: un rol desconocido o una ruta nueva no
// ganan acceso hasta aparecer aquí.
// ============================================================================

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKey {
    Login,
    Dashboard,
    Stock,
    Receive,
    Issue,
    Transactions,
    Requisitions,
    Admin,
}

impl RouteKey {
    pub fn parse(key: &str) -> Option<RouteKey> {
        match key {
            "login" => Some(RouteKey::Login),
            "dashboard" => Some(RouteKey::Dashboard),
            "stock" => Some(RouteKey::Stock),
            "receive" => Some(RouteKey::Receive),
            "issue" => Some(RouteKey::Issue),
            "transactions" => Some(RouteKey::Transactions),
            "requisitions" => Some(RouteKey::Requisitions),
            "admin" => Some(RouteKey::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKey::Login => "login",
            RouteKey::Dashboard => "dashboard",
            RouteKey::Stock => "stock",
            RouteKey::Receive => "receive",
            RouteKey::Issue => "issue",
            RouteKey::Transactions => "transactions",
            RouteKey::Requisitions => "requisitions",
            RouteKey::Admin => "admin",
        }
    }

    /// Etiqueta del menú lateral (la UI del producto está en tailandés).
    pub fn menu_label(&self) -> &'static str {
        match self {
            RouteKey::Login => "เข้าสู่ระบบ",
            RouteKey::Dashboard => "แดชบอร์ด",
            RouteKey::Stock => "สต็อกคงเหลือ",
            RouteKey::Receive => "รับเข้า",
            RouteKey::Issue => "จ่ายออก",
            RouteKey::Transactions => "ธุรกรรม",
            RouteKey::Requisitions => "ใบเบิก",
            RouteKey::Admin => "จัดการข้อมูลหลัก",
        }
    }
}

/// Rutas visibles en el menú para cada rol, en orden de presentación.
/// STORE incluye receive/issue: opera el almacén además de consultar.
pub fn permitted_routes(role: Role) -> &'static [RouteKey] {
    match role {
        Role::Requester => &[RouteKey::Dashboard, RouteKey::Stock, RouteKey::Requisitions],
        Role::Store => &[
            RouteKey::Dashboard,
            RouteKey::Stock,
            RouteKey::Receive,
            RouteKey::Issue,
            RouteKey::Transactions,
            RouteKey::Requisitions,
        ],
        Role::Admin => &[
            RouteKey::Dashboard,
            RouteKey::Stock,
            RouteKey::Receive,
            RouteKey::Issue,
            RouteKey::Transactions,
            RouteKey::Requisitions,
            RouteKey::Admin,
        ],
    }
}

/// Login es libre; el resto se consulta contra la tabla. Sin rol => denegado.
pub fn is_permitted(role: Option<Role>, route: RouteKey) -> bool {
    if route == RouteKey::Login {
        return true;
    }
    match role {
        Some(role) => permitted_routes(role).contains(&route),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requester_cannot_reach_admin_or_warehouse_ops() {
        assert!(is_permitted(Some(Role::Requester), RouteKey::Dashboard));
        assert!(is_permitted(Some(Role::Requester), RouteKey::Requisitions));
        assert!(!is_permitted(Some(Role::Requester), RouteKey::Admin));
        assert!(!is_permitted(Some(Role::Requester), RouteKey::Receive));
        assert!(!is_permitted(Some(Role::Requester), RouteKey::Issue));
    }

    #[test]
    fn store_operates_the_warehouse() {
        assert!(is_permitted(Some(Role::Store), RouteKey::Receive));
        assert!(is_permitted(Some(Role::Store), RouteKey::Issue));
        assert!(is_permitted(Some(Role::Store), RouteKey::Transactions));
        assert!(!is_permitted(Some(Role::Store), RouteKey::Admin));
    }

    #[test]
    fn admin_reaches_everything() {
        for route in permitted_routes(Role::Admin) {
            assert!(is_permitted(Some(Role::Admin), *route));
        }
        assert!(is_permitted(Some(Role::Admin), RouteKey::Admin));
    }

    #[test]
    fn missing_role_only_gets_login() {
        assert!(is_permitted(None, RouteKey::Login));
        assert!(!is_permitted(None, RouteKey::Dashboard));
        assert!(!is_permitted(None, RouteKey::Stock));
    }

    #[test]
    fn unknown_route_key_does_not_parse() {
        assert_eq!(RouteKey::parse("reports"), None);
        assert_eq!(RouteKey::parse("DASHBOARD"), None);
    }
}
