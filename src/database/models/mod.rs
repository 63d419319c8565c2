pub mod attribute;
pub mod recipe;
pub mod user;

pub use attribute::{Attribute, AttributeKind};
pub use recipe::{NewRecipe, Recipe, RecipeChanges};
pub use user::{normalize_email, NewUser, User, UserChanges};
