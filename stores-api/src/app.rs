/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use stores_api::{app::AppState, config::Config};
/// use stores_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = stores_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use stores_shared::auth::{
    jwt::TokenType,
    middleware::{authenticate, AuthContext},
    revocation::{InMemoryRevocationList, RevocationBackend, RevocationStore, SqlRevocationList},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Revoked token IDs
    pub revocations: Arc<dyn RevocationStore>,
}

impl AppState {
    /// Creates new application state with the configured revocation backend
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let revocations: Arc<dyn RevocationStore> = match config.jwt.revocation_backend {
            RevocationBackend::Memory => Arc::new(InMemoryRevocationList::new()),
            RevocationBackend::Database => Arc::new(SqlRevocationList::new(db.clone())),
        };

        Self::with_revocations(db, config, revocations)
    }

    /// Creates new application state around an existing revocation list
    pub fn with_revocations(
        db: SqlitePool,
        config: Config,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            revocations,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                      # Health check (public)
/// ├── POST   /register                    # Public
/// ├── POST   /login                       # Public
/// ├── POST   /refresh                     # Refresh token
/// └── (access token required)
///     ├── POST   /logout
///     ├── GET    /user/:id, DELETE (admin)
///     ├── GET    /store, POST
///     ├── GET    /store/:id, PUT, DELETE
///     ├── GET    /store/:id/tag, POST
///     ├── GET    /item, POST
///     ├── GET    /item/:id, PUT, DELETE (admin)
///     ├── POST   /item/:id/tag/:tag_id, DELETE
///     └── GET    /tag/:id, DELETE
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Access token verification (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let protected_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route(
            "/user/:user_id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .route(
            "/store",
            get(routes::stores::list_stores).post(routes::stores::create_store),
        )
        .route(
            "/store/:store_id",
            get(routes::stores::get_store)
                .put(routes::stores::upsert_store)
                .delete(routes::stores::delete_store),
        )
        .route(
            "/store/:store_id/tag",
            get(routes::tags::list_store_tags).post(routes::tags::create_tag),
        )
        .route(
            "/item",
            get(routes::items::list_items).post(routes::items::create_item),
        )
        .route(
            "/item/:item_id",
            get(routes::items::get_item)
                .put(routes::items::upsert_item)
                .delete(routes::items::delete_item),
        )
        .route(
            "/item/:item_id/tag/:tag_id",
            post(routes::tags::link_tag).delete(routes::tags::unlink_tag),
        )
        .route(
            "/tag/:tag_id",
            get(routes::tags::get_tag).delete(routes::tags::delete_tag),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Verifies the access token from the Authorization header (signature,
/// expiry, type, revocation), then injects `AuthContext` into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let claims = authenticate(
        header.as_deref(),
        state.jwt_secret(),
        TokenType::Access,
        state.revocations.as_ref(),
    )
    .await?;

    req.extensions_mut().insert(AuthContext::from(&claims));

    Ok(next.run(req).await)
}
