// handlers/protected/recipe/attribute.rs - shared list/create for tags and ingredients

use tracing::debug;

use crate::api::format::AttributeView;
use crate::api::payload::AttributePayload;
use crate::database::models::AttributeKind;
use crate::filter::{AttributeFilter, AttributeQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// The caller's tags or ingredients, name descending
pub async fn list(
    state: &AppState,
    auth_user: &AuthUser,
    kind: AttributeKind,
    query: &AttributeQuery,
) -> ApiResult<Vec<AttributeView>> {
    let filter = AttributeFilter::from_query(query);
    let attributes = state.store.list_attributes(kind, auth_user.id, filter).await?;

    Ok(ApiResponse::success(
        attributes.into_iter().map(AttributeView::from).collect(),
    ))
}

/// Create a tag or ingredient owned by the caller
pub async fn create(
    state: &AppState,
    auth_user: &AuthUser,
    kind: AttributeKind,
    payload: AttributePayload,
) -> ApiResult<AttributeView> {
    let name = payload.validate()?;
    let attribute = state.store.create_attribute(kind, auth_user.id, &name).await?;

    debug!("Created {} {} for user {}", kind.label(), attribute.id, auth_user.id);
    Ok(ApiResponse::created(AttributeView::from(attribute)))
}
