pub mod create;
pub mod token;

pub use create::post as create_post;
pub use token::post as token_post;
pub use token::refresh_post as token_refresh_post;
