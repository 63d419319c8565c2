// handlers/protected/recipe/tags.rs - /recipe/tags handlers

use axum::extract::{Extension, Query, State};

use super::attribute;
use crate::api::format::AttributeView;
use crate::api::payload::AttributePayload;
use crate::api::ApiJson;
use crate::database::models::AttributeKind;
use crate::filter::AttributeQuery;
use crate::middleware::{ApiResult, AuthUser};
use crate::state::AppState;

/// GET /recipe/tags - List the caller's tags
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AttributeQuery>,
) -> ApiResult<Vec<AttributeView>> {
    attribute::list(&state, &auth_user, AttributeKind::Tag, &query).await
}

/// POST /recipe/tags - Create a tag
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<AttributePayload>,
) -> ApiResult<AttributeView> {
    attribute::create(&state, &auth_user, AttributeKind::Tag, payload).await
}
