#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use recipe_api::config::AppConfig;
use recipe_api::database::MemoryStore;
use recipe_api::{app, AppState};

pub const PASSWORD: &str = "testpass123";

/// One server per test: fresh in-memory store and media directory
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub media: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let media = tempfile::tempdir().context("failed to create media dir")?;

        let mut config = AppConfig::development();
        config.media.root = media.path().to_path_buf();
        config.api.enable_request_logging = false;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let router = app(AppState::new(config, Arc::new(MemoryStore::new())));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            media,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/user/create"))
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?)
    }

    pub async fn token(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/user/token"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Register `email` and return its access token
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self.register(email, PASSWORD, "Test User").await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body = data(self.token(email, PASSWORD).await?).await?;
        body["access"]
            .as_str()
            .map(str::to_string)
            .context("no access token in response")
    }

    pub async fn get(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn patch(&self, token: &str, path: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn delete(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Create a tag or ingredient and return its id
    pub async fn create_attribute(&self, token: &str, collection: &str, name: &str) -> Result<i64> {
        let res = self
            .post(token, &format!("/recipe/{}", collection), json!({ "name": name }))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create {} failed", collection);
        data(res).await?["id"].as_i64().context("missing id")
    }

    /// Create a recipe with defaults overridden by `fields`; returns the flat representation
    pub async fn create_recipe(&self, token: &str, fields: Value) -> Result<Value> {
        let mut body = json!({ "title": "Sample recipe", "time_minutes": 10, "price": "5.00" });
        if let (Some(body), Some(fields)) = (body.as_object_mut(), fields.as_object()) {
            for (key, value) in fields {
                body.insert(key.clone(), value.clone());
            }
        }

        let res = self.post(token, "/recipe/recipes", body).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create recipe failed: {}", res.status());
        data(res).await
    }
}

/// Unwrap the `{"success": true, "data": ...}` envelope
pub async fn data(res: Response) -> Result<Value> {
    let body = res.json::<Value>().await?;
    anyhow::ensure!(body["success"] == true, "unexpected error envelope: {}", body);
    Ok(body["data"].clone())
}

/// Parse an error envelope
pub async fn error(res: Response) -> Result<Value> {
    let body = res.json::<Value>().await?;
    anyhow::ensure!(body["success"] == false, "expected an error envelope: {}", body);
    Ok(body)
}

/// Ids of a JSON array of objects, in order
pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_i64()).collect())
        .unwrap_or_default()
}
