// ============================================================================
// TRANSACTIONS - Página de aterrizaje de transacciones
// ============================================================================

use std::rc::Rc;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::set_inner_html;
use crate::router::PageHandle;

pub fn render(_ctx: Rc<AppContext>, host: &Element) -> Result<PageHandle, String> {
    set_inner_html(
        host,
        r##"<h4 class="mb-3">ธุรกรรม</h4>
        <div class="row g-3">
            <div class="col-md-6">
                <a href="#/receive" class="text-decoration-none">
                    <div class="card h-100"><div class="card-body text-center py-5">
                        <div class="fs-1">📥</div>
                        <h5 class="mt-2">รับเข้าคลัง</h5>
                        <p class="text-muted small mb-0">บันทึกการรับสินค้าจากผู้ขายเข้าคลัง</p>
                    </div></div>
                </a>
            </div>
            <div class="col-md-6">
                <a href="#/issue" class="text-decoration-none">
                    <div class="card h-100"><div class="card-body text-center py-5">
                        <div class="fs-1">📤</div>
                        <h5 class="mt-2">จ่ายออกจากคลัง</h5>
                        <p class="text-muted small mb-0">บันทึกการจ่ายสินค้าให้แผนกต่างๆ</p>
                    </div></div>
                </a>
            </div>
        </div>"##,
    );
    Ok(PageHandle::empty())
}
