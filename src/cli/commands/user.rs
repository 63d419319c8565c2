use anyhow::bail;

use crate::api::payload::CreateUserPayload;
use crate::auth::hash_password;
use crate::config::AppConfig;
use crate::database::models::NewUser;
use crate::database::{DatabaseManager, PgStore, Store, StoreError};

/// Register a user directly against the configured database
pub async fn create(config: AppConfig, email: String, name: String, password: String) -> anyhow::Result<()> {
    let security = &config.security;
    let user = CreateUserPayload {
        email: Some(email),
        password: Some(password),
        name: Some(name),
    }
    .validate(security.min_password_length)
    .map_err(|e| anyhow::anyhow!("{}", e.to_json()))?;

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    let store = PgStore::new(pool);

    let password_hash = hash_password(&user.password, security.bcrypt_cost).await?;
    let created = match store
        .create_user(NewUser {
            email: user.email,
            name: user.name,
            password_hash,
        })
        .await
    {
        Ok(created) => created,
        Err(StoreError::DuplicateEmail(email)) => bail!("user with email {} already exists", email),
        Err(e) => return Err(e.into()),
    };

    println!("Created user {} <{}>", created.id, created.email);
    Ok(())
}
