use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{
    Attribute, AttributeKind, NewRecipe, NewUser, Recipe, RecipeChanges, User, UserChanges,
};
use crate::filter::{AttributeFilter, RecipeFilter};

/// Errors from the storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("{field} references unknown id {id}")]
    UnknownReference { field: &'static str, id: i64 },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for users and their owned resources.
///
/// Every method taking `owner` only ever sees rows belonging to that user;
/// rows of other users behave as if they did not exist.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness check used by `/health`
    async fn ping(&self) -> Result<(), StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, StoreError>;

    /// Ordered by name descending
    async fn list_attributes(
        &self,
        kind: AttributeKind,
        owner: i64,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, StoreError>;

    async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner: i64,
        name: &str,
    ) -> Result<Attribute, StoreError>;

    /// The subset of `ids` owned by `owner`, ordered by id
    async fn find_attributes(
        &self,
        kind: AttributeKind,
        owner: i64,
        ids: &[i64],
    ) -> Result<Vec<Attribute>, StoreError>;

    /// Newest first
    async fn list_recipes(&self, owner: i64, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError>;

    async fn find_recipe(&self, owner: i64, id: i64) -> Result<Option<Recipe>, StoreError>;

    async fn create_recipe(&self, owner: i64, recipe: NewRecipe) -> Result<Recipe, StoreError>;

    async fn update_recipe(
        &self,
        owner: i64,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Recipe, StoreError>;

    /// Returns the removed recipe so callers can clean up its image
    async fn delete_recipe(&self, owner: i64, id: i64) -> Result<Recipe, StoreError>;

    /// Swap the image reference in one step, returning the reference it replaced
    async fn set_recipe_image(
        &self,
        owner: i64,
        id: i64,
        image: Option<String>,
    ) -> Result<(Recipe, Option<String>), StoreError>;
}

/// Drop repeated ids, keeping first occurrence order
pub fn distinct_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Fail with the first requested id that did not resolve for the owner
pub fn ensure_all_found(
    kind: AttributeKind,
    requested: &[i64],
    found: &[i64],
) -> Result<(), StoreError> {
    match requested.iter().find(|id| !found.contains(id)) {
        Some(&id) => Err(StoreError::UnknownReference {
            field: kind.field(),
            id,
        }),
        None => Ok(()),
    }
}
