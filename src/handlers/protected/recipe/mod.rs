pub mod attribute;
pub mod ingredients;
pub mod recipes;
pub mod record;
pub mod tags;
pub mod upload;

// Re-export handler functions for use in routing
pub use tags::get as tags_get;
pub use tags::post as tags_post;

pub use ingredients::get as ingredients_get;
pub use ingredients::post as ingredients_post;

pub use recipes::get as recipes_get;
pub use recipes::post as recipes_post;

pub use record::delete as recipe_delete;
pub use record::get as recipe_get;
pub use record::patch as recipe_patch;
pub use record::put as recipe_put;

pub use upload::post as upload_image_post;
