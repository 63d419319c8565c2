// handlers/public/user/create.rs - POST /user/create handler

use axum::extract::State;
use tracing::info;

use crate::api::format::UserView;
use crate::api::payload::CreateUserPayload;
use crate::api::ApiJson;
use crate::auth::hash_password;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /user/create - Register a new user account
///
/// Responds 201 with `{email, name}`. Nothing is stored when validation fails.
pub async fn post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserPayload>,
) -> ApiResult<UserView> {
    let security = &state.config.security;
    let user = payload.validate(security.min_password_length)?;

    if state.store.find_user_by_email(&user.email).await?.is_some() {
        return Err(ApiError::field("email", "user with this email already exists."));
    }

    let password_hash = hash_password(&user.password, security.bcrypt_cost).await?;
    let created = state
        .store
        .create_user(NewUser {
            email: user.email,
            name: user.name,
            password_hash,
        })
        .await?;

    info!("Registered user {}", created.id);
    Ok(ApiResponse::created(UserView::from(&created)))
}
