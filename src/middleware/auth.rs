use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{bearer_token, AuthError, TokenKind};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Rejects requests without a valid access token for an active user
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
        .transpose()?;

    let token = bearer_token(header)?;
    let claims = state.tokens.verify(token, TokenKind::Access)?;

    let user = state
        .store
        .find_user(claims.user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or(AuthError::UnknownUser)?;

    request.extensions_mut().insert(AuthUser::from(&user));
    Ok(next.run(request).await)
}
