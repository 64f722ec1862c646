pub mod masters;
pub mod requisition;
pub mod session;
pub mod stock;

pub use masters::*;
pub use requisition::*;
pub use session::*;
pub use stock::*;
