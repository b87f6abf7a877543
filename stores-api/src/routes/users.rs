/// User endpoints
///
/// - `GET /user/:user_id` - Look up a user
/// - `DELETE /user/:user_id` - Delete a user (admin only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use stores_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::User,
};

/// Public view of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found.".to_string())
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(user.into()))
}

/// # Errors
///
/// - `401 Unauthorized`: Caller is not an admin
/// - `404 Not Found`: No such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    if !User::delete(&state.db, user_id).await? {
        return Err(user_not_found());
    }

    tracing::info!(user_id, deleted_by = auth.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
