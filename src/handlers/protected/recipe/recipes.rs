// handlers/protected/recipe/recipes.rs - /recipe/recipes collection handlers

use axum::extract::{Extension, Query, State};
use tracing::info;

use crate::api::format::RecipeView;
use crate::api::payload::RecipePayload;
use crate::api::ApiJson;
use crate::filter::{RecipeFilter, RecipeQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /recipe/recipes - List the caller's recipes, newest first
///
/// `?tags=1,2` and `?ingredients=3` narrow the list to recipes carrying any of
/// the given ids; both together must each match.
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RecipeQuery>,
) -> ApiResult<Vec<RecipeView>> {
    let filter = RecipeFilter::from_query(&query)?;
    let recipes = state.store.list_recipes(auth_user.id, &filter).await?;

    Ok(ApiResponse::success(
        recipes.into_iter().map(RecipeView::from).collect(),
    ))
}

/// POST /recipe/recipes - Create a recipe owned by the caller
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<RecipePayload>,
) -> ApiResult<RecipeView> {
    let recipe = payload.into_new_recipe()?;
    let created = state.store.create_recipe(auth_user.id, recipe).await?;

    info!("Created recipe {} for user {}", created.id, auth_user.id);
    Ok(ApiResponse::created(RecipeView::from(created)))
}
