pub mod format;
pub mod json;
pub mod storage;

pub use format::*;
pub use json::*;
pub use storage::*;
