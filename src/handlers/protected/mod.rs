// handlers/protected/mod.rs - Protected handlers (access token required)
//
// Every handler here receives the `AuthUser` injected by `require_auth` and
// only ever reads or writes rows owned by that user.

pub mod recipe;
pub mod user;
