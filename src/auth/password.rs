use bcrypt::{hash, verify};
use once_cell::sync::OnceCell;
use tokio::task;

use super::AuthError;

/// Hash checked when no account matches, so unknown emails cost the same bcrypt work
static DECOY_HASH: OnceCell<String> = OnceCell::new();

/// Hash a password with bcrypt at the given cost.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_string();
    task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a stored bcrypt hash. A malformed hash never matches.
pub async fn verify_password(password: &str, password_hash: &str) -> bool {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    match task::spawn_blocking(move || verify_hash(&password, &password_hash)).await {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}

/// Run a verification that always fails, for logins naming no account.
pub async fn verify_missing_account(password: &str, cost: u32) {
    let password = password.to_string();
    let result = task::spawn_blocking(move || {
        let decoy = DECOY_HASH.get_or_try_init(|| hash(uuid::Uuid::new_v4().to_string(), cost))?;
        verify(password, decoy)
    })
    .await;

    match result {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!("Decoy password verification failed: {}", e),
        Err(e) => tracing::error!("Password verification task failed: {}", e),
    }
}

fn verify_hash(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Password verification failed on stored hash: {}", e);
            false
        }
    }
}
