pub mod me;

pub use me::get as me_get;
pub use me::patch as me_patch;
pub use me::put as me_put;
