// ============================================================================
// RECEIVE - Página de recepción (wrapper del formulario compartido)
// ============================================================================

use std::rc::Rc;
use web_sys::Element;

use crate::app::AppContext;
use crate::router::PageHandle;
use crate::views::tx_form::{self, TxKind};

pub async fn render(ctx: Rc<AppContext>, host: &Element) -> Result<PageHandle, String> {
    tx_form::render(ctx, host, TxKind::Receive).await
}
