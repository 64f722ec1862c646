// ============================================================================
// APP - Composición de la aplicación (wiring de servicios + router)
// ============================================================================
// Único sitio donde se eligen implementaciones concretas: localStorage como
// backend de persistencia y force_logout como hook de sesión inválida. El
// resto del código recibe todo inyectado vía AppContext.
// ============================================================================

use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::router::Router;
use crate::services::session;
use crate::services::{ApiClient, LocalCache, SessionStore};
use crate::utils::{KeyValueBackend, LocalStorageBackend};

/// Dependencias compartidas por router y vistas.
pub struct AppContext {
    pub store: Rc<SessionStore>,
    pub api: Rc<ApiClient>,
    pub cache: Rc<LocalCache>,
}

/// Arranca la app: construye el contexto, conecta el hook de logout forzado
/// y pone el router a escuchar. El router queda vivo a través del listener
/// de hashchange, así que el Rc devuelto puede soltarse.
pub fn bootstrap() -> Result<Rc<Router>, JsValue> {
    let backend: Rc<dyn KeyValueBackend> = Rc::new(LocalStorageBackend);
    let store = Rc::new(SessionStore::new(backend.clone()));
    let api = Rc::new(ApiClient::new(store.clone()));
    let cache = Rc::new(LocalCache::new(backend));

    // sesión inválida detectada por el gateway -> limpiar y volver al login
    {
        let store = store.clone();
        api.set_session_invalid_hook(move || session::force_logout(&store));
    }

    let ctx = Rc::new(AppContext { store, api, cache });
    let router = Router::new(ctx);
    router.start()?;
    Ok(router)
}
