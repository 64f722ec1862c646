// ============================================================================
// SERVICES - Gateway HTTP, sesión, caché y cargas de dominio
// ============================================================================

pub mod api;
pub mod cache;
pub mod masters;
pub mod session;
pub mod stock;

pub use api::ApiClient;
pub use cache::LocalCache;
pub use session::SessionStore;
