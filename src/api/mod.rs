pub mod extract;
pub mod format;
pub mod payload;
pub mod validation;

pub use extract::{ApiJson, ApiPath};
