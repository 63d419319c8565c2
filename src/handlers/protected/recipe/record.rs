// handlers/protected/recipe/record.rs - /recipe/recipes/:id handlers

use axum::extract::{Extension, State};
use tracing::info;

use crate::api::format::RecipeDetailView;
use crate::api::payload::RecipePayload;
use crate::api::{ApiJson, ApiPath};
use crate::database::models::{AttributeKind, Recipe, RecipeChanges};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /recipe/recipes/:id - Recipe detail with tags and ingredients expanded
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<RecipeDetailView> {
    let recipe = state
        .store
        .find_recipe(auth_user.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    detail(&state, recipe).await.map(ApiResponse::success)
}

/// PUT /recipe/recipes/:id - Replace a recipe
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<RecipePayload>,
) -> ApiResult<RecipeDetailView> {
    let changes = payload.into_replacement()?;
    update(&state, &auth_user, id, changes).await
}

/// PATCH /recipe/recipes/:id - Update only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<RecipePayload>,
) -> ApiResult<RecipeDetailView> {
    let changes = payload.into_changes()?;
    update(&state, &auth_user, id, changes).await
}

/// DELETE /recipe/recipes/:id - Remove a recipe and its stored image
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    let removed = state.store.delete_recipe(auth_user.id, id).await?;
    if let Some(image) = &removed.image {
        state.media.remove(image).await;
    }

    info!("Deleted recipe {} of user {}", id, auth_user.id);
    Ok(ApiResponse::no_content())
}

async fn update(
    state: &AppState,
    auth_user: &AuthUser,
    id: i64,
    changes: RecipeChanges,
) -> ApiResult<RecipeDetailView> {
    let updated = state.store.update_recipe(auth_user.id, id, changes).await?;
    detail(state, updated).await.map(ApiResponse::success)
}

/// Resolve association ids into `{id, name}` objects
async fn detail(state: &AppState, recipe: Recipe) -> Result<RecipeDetailView, ApiError> {
    let owner = recipe.user_id;
    let tags = state
        .store
        .find_attributes(AttributeKind::Tag, owner, &recipe.tags)
        .await?;
    let ingredients = state
        .store
        .find_attributes(AttributeKind::Ingredient, owner, &recipe.ingredients)
        .await?;

    Ok(RecipeDetailView::new(recipe, tags, ingredients))
}
