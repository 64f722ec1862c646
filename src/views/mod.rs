// ============================================================================
// VIEWS - Páginas y componentes de UI
// ============================================================================

pub mod admin;
pub mod dashboard;
pub mod feedback;
pub mod issue;
pub mod login;
pub mod receive;
pub mod requisitions;
pub mod shell;
pub mod stock;
pub mod transactions;
pub mod tx_form;

use web_sys::Element;

use crate::dom::get_element_by_id;

pub const APP_ROOT_ID: &str = "app";
pub const PAGE_HOST_ID: &str = "page-host";

/// Raíz montada en index.html donde vive toda la app
pub fn app_root() -> Option<Element> {
    get_element_by_id(APP_ROOT_ID)
}

/// Contenedor de la página activa dentro del shell
pub fn page_host() -> Option<Element> {
    get_element_by_id(PAGE_HOST_ID)
}
