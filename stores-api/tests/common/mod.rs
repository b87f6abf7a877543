/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - A private in-memory database with migrations applied
/// - The full router, driven through `tower::Service`
/// - Register/login helpers and authenticated request helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use stores_api::app::{build_router, AppState};
use stores_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use stores_shared::auth::jwt::TokenLifetimes;
use stores_shared::auth::revocation::RevocationBackend;
use stores_shared::db::{migrations::run_migrations, pool};
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "correct horse battery staple";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
}

pub fn test_config(revocation_backend: RevocationBackend) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            lifetimes: TokenLifetimes::default(),
            revocation_backend,
        },
    }
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_backend(RevocationBackend::Memory).await
    }

    pub async fn with_backend(revocation_backend: RevocationBackend) -> anyhow::Result<Self> {
        let config = test_config(revocation_backend);

        let db = pool::create_pool(pool::DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Sends a request and returns the status with the JSON body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!(
                    "{} {} returned non-JSON body: {}",
                    method,
                    uri,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        (status, json)
    }

    pub async fn register(&self, username: &str) -> StatusCode {
        let (status, _) = self
            .send(
                "POST",
                "/register",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        status
    }

    /// Logs in and returns `(access_token, refresh_token)`
    pub async fn login(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .send(
                "POST",
                "/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Registers and logs in a user, returning its access token
    pub async fn signed_in(&self, username: &str) -> String {
        assert_eq!(self.register(username).await, StatusCode::CREATED);
        self.login(username).await.0
    }

    /// Creates a store and returns its ID
    pub async fn create_store(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .send("POST", "/store", Some(token), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "store create failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    /// Creates an item and returns its ID
    pub async fn create_item(&self, token: &str, name: &str, store_id: i64) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/item",
                Some(token),
                Some(json!({ "name": name, "price": 1.0, "store_id": store_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "item create failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    /// Creates a tag and returns its ID
    pub async fn create_tag(&self, token: &str, store_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                &format!("/store/{}/tag", store_id),
                Some(token),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "tag create failed: {}", body);
        body["id"].as_i64().unwrap()
    }
}
