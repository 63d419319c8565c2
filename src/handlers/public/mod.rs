// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account registration, token acquisition, and service status.

pub mod root;
pub mod user;

pub use root::{health, index};
