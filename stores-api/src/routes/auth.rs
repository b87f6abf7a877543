/// Authentication endpoints
///
/// - `POST /register` - Create an account
/// - `POST /login` - Exchange credentials for an access/refresh token pair
/// - `POST /logout` - Revoke the presented access token
/// - `POST /refresh` - Exchange a refresh token for a new access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use stores_shared::{
    auth::{
        jwt::{self, TokenPair, TokenType},
        middleware::{authenticate, AuthContext, AuthError},
        password,
    },
    models::{CreateUser, User},
};
use validator::Validate;

/// Credentials for both register and login
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 80, message = "Username must be 1-80 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New non-fresh access token
    pub access_token: String,
}

/// Register a new user
///
/// The first account created on an empty database is the administrator.
///
/// # Errors
///
/// - `409 Conflict`: Username already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    if User::username_exists(&state.db, &req.username).await? {
        return Err(ApiError::Conflict(
            "User with that username already exists.".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent registration can still win the race; the unique
    // constraint turns that into a 409 as well.
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, is_admin = user.is_admin, "User registered");

    Ok((StatusCode::CREATED, Json(MessageResponse::new("User created."))))
}

/// Login with username and password
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ...", "refresh_token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown user or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<TokenPair>> {
    let Json(req) = payload?;
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid credentials.".to_string());

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Login rejected");
        return Err(invalid());
    }

    let tokens = jwt::issue_login_tokens(
        user.id,
        user.is_admin,
        state.config.jwt.lifetimes,
        state.jwt_secret(),
    )?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(tokens))
}

/// Revoke the access token used for this request
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    state.revocations.revoke(auth.jti, auth.expires_at).await?;

    tracing::info!(user_id = auth.user_id, jti = %auth.jti, "User logged out");

    Ok(Json(MessageResponse::new("Successfully logged out.")))
}

/// Exchange a refresh token for a new access token
///
/// The refresh token goes in `Authorization: Bearer`. It is revoked before
/// anything else happens, so of two concurrent uses only one succeeds. The
/// role claim is re-read from the user row.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid, expired or already used refresh
///   token, or the user no longer exists
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<RefreshResponse>> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let claims = authenticate(
        header,
        state.jwt_secret(),
        TokenType::Refresh,
        state.revocations.as_ref(),
    )
    .await?;

    if !state.revocations.revoke(claims.jti, claims.exp).await? {
        return Err(AuthError::Revoked.into());
    }

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists.".to_string()))?;

    let access_token = jwt::issue_refreshed_access_token(
        user.id,
        user.is_admin,
        state.config.jwt.lifetimes.access,
        state.jwt_secret(),
    )?;

    tracing::info!(user_id = user.id, "Access token refreshed");

    Ok(Json(RefreshResponse { access_token }))
}
