// handlers/protected/recipe/upload.rs - POST /recipe/recipes/:id/upload-image

use axum::extract::{Extension, Multipart, State};
use tracing::info;

use crate::api::format::RecipeImageView;
use crate::api::ApiPath;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

/// POST /recipe/recipes/:id/upload-image - Attach an image to a recipe
///
/// Expects a multipart form with an `image` file field. Replacing an image
/// removes the previous file.
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    mut multipart: Multipart,
) -> ApiResult<RecipeImageView> {
    if state.store.find_recipe(auth_user.id, id).await?.is_none() {
        return Err(ApiError::not_found("Recipe not found"));
    }

    let mut bytes = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            bytes = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = bytes.ok_or_else(|| {
        ApiError::field(IMAGE_FIELD, "No file was submitted.")
    })?;

    let reference = state.media.save_recipe_image(&bytes).await?;

    // Remove only what this write displaced
    let (updated, previous) = match state
        .store
        .set_recipe_image(auth_user.id, id, Some(reference.clone()))
        .await
    {
        Ok(swapped) => swapped,
        Err(e) => {
            state.media.remove(&reference).await;
            return Err(e.into());
        }
    };

    if let Some(previous) = previous.filter(|previous| *previous != reference) {
        state.media.remove(&previous).await;
    }

    info!("Stored image {} for recipe {}", reference, id);
    Ok(ApiResponse::success(RecipeImageView::from(updated)))
}
