use serde::{Deserialize, Serialize};

/// Configuración de la app, resuelta en tiempo de compilación (.env via build.rs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// URL por defecto del endpoint JSON. Vacía = el usuario debe escribirla en login.
    pub default_api_url: String,
    /// Si true y existe una URL resoluble (default o guardada), el login no
    /// muestra el campo de URL editable. Evita que usuarios apunten al backend equivocado.
    pub lock_api_url: bool,
    pub masters_cache_ttl_ms: i64,
    pub stock_cache_ttl_ms: i64,
    pub dashboard_poll_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_api_url: String::new(),
            lock_api_url: true,
            masters_cache_ttl_ms: 5 * 60 * 1000,
            stock_cache_ttl_ms: 60 * 1000,
            dashboard_poll_ms: 5000,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        Self {
            default_api_url: option_env!("DEFAULT_API_URL").unwrap_or("").to_string(),
            lock_api_url: option_env!("LOCK_API_URL")
                .unwrap_or("true")
                .parse()
                .unwrap_or(true),
            masters_cache_ttl_ms: option_env!("MASTERS_CACHE_TTL_MS")
                .unwrap_or("300000")
                .parse()
                .unwrap_or(300_000),
            stock_cache_ttl_ms: option_env!("STOCK_CACHE_TTL_MS")
                .unwrap_or("60000")
                .parse()
                .unwrap_or(60_000),
            dashboard_poll_ms: option_env!("DASHBOARD_POLL_MS")
                .unwrap_or("5000")
                .parse()
                .unwrap_or(5000),
        }
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_locks_api_url() {
        let cfg = AppConfig::default();
        assert!(cfg.lock_api_url);
        assert_eq!(cfg.masters_cache_ttl_ms, 300_000);
        assert_eq!(cfg.stock_cache_ttl_ms, 60_000);
    }
}
