// handlers/protected/user/me.rs - /user/me profile handlers

use axum::extract::{Extension, State};
use tracing::info;

use crate::api::format::UserView;
use crate::api::payload::UpdateUserPayload;
use crate::api::ApiJson;
use crate::auth::hash_password;
use crate::database::models::UserChanges;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /user/me - Profile of the authenticated user
pub async fn get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(UserView {
        email: auth_user.email,
        name: auth_user.name,
    }))
}

/// PUT /user/me - Replace email, name and password
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<UpdateUserPayload>,
) -> ApiResult<UserView> {
    update(state, auth_user, payload, false).await
}

/// PATCH /user/me - Update only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<UpdateUserPayload>,
) -> ApiResult<UserView> {
    update(state, auth_user, payload, true).await
}

async fn update(
    state: AppState,
    auth_user: AuthUser,
    payload: UpdateUserPayload,
    partial: bool,
) -> ApiResult<UserView> {
    let security = &state.config.security;
    let changes = payload.validate(partial, security.min_password_length)?;

    if let Some(email) = &changes.email {
        let taken = state
            .store
            .find_user_by_email(email)
            .await?
            .is_some_and(|other| other.id != auth_user.id);
        if taken {
            return Err(ApiError::field("email", "user with this email already exists."));
        }
    }

    let password_hash = match &changes.password {
        Some(password) => Some(hash_password(password, security.bcrypt_cost).await?),
        None => None,
    };

    let user = state
        .store
        .update_user(
            auth_user.id,
            UserChanges {
                email: changes.email,
                name: changes.name,
                password_hash,
            },
        )
        .await?;

    info!("Updated profile of user {}", user.id);
    Ok(ApiResponse::success(UserView::from(&user)))
}
