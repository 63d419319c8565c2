// handlers/public/user/token.rs - token acquisition and refresh

use axum::extract::State;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::payload::{RefreshPayload, TokenPayload};
use crate::api::ApiJson;
use crate::auth::{verify_missing_account, verify_password, AuthError, TokenKind, TokenPair};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// POST /user/token - Exchange email and password for an access/refresh pair
pub async fn post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TokenPayload>,
) -> ApiResult<TokenPair> {
    let (email, password) = payload.validate()?;

    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) => {
            let valid = verify_password(&password, &user.password_hash).await;
            Some(user).filter(|user| valid && user.is_active)
        }
        None => {
            verify_missing_account(&password, state.config.security.bcrypt_cost).await;
            None
        }
    };

    let Some(user) = user else {
        warn!("Rejected credentials for {}", email);
        return Err(AuthError::InvalidCredentials.into());
    };

    let pair = state.tokens.issue_pair(user.id)?;
    debug!("Issued token pair for user {}", user.id);
    Ok(ApiResponse::success(pair))
}

/// POST /user/token/refresh - Trade a refresh token for a new access token
pub async fn refresh_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> ApiResult<AccessToken> {
    let refresh = payload.validate()?;
    let claims = state.tokens.verify(&refresh, TokenKind::Refresh)?;

    // The account may have been removed or deactivated since issuance
    let active = state
        .store
        .find_user(claims.user_id)
        .await?
        .is_some_and(|user| user.is_active);
    if !active {
        return Err(AuthError::UnknownUser.into());
    }

    let access = state.tokens.issue(TokenKind::Access, claims.user_id)?;
    Ok(ApiResponse::success(AccessToken { access }))
}
