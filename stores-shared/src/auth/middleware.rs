/// Bearer token authentication
///
/// Turns an `Authorization` header into verified claims. Verification covers
/// header shape, signature, expiry, token type and the revocation list, in
/// that order. The API server calls [`authenticate`] from its middleware and
/// stores the resulting [`AuthContext`] in the request extensions.
///
/// # Example
///
/// ```
/// use stores_shared::auth::jwt::{create_token, Claims, TokenType};
/// use stores_shared::auth::middleware::{authenticate, AuthContext};
/// use stores_shared::auth::revocation::InMemoryRevocationList;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key";
/// let token = create_token(&Claims::new(1, false, TokenType::Access, true), secret)?;
/// let header = format!("Bearer {}", token);
///
/// let revocations = InMemoryRevocationList::new();
/// let claims = authenticate(Some(&header), secret, TokenType::Access, &revocations).await?;
/// let auth = AuthContext::from(&claims);
/// assert_eq!(auth.user_id, 1);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, validate_refresh_token, Claims, JwtError, TokenType};
use super::revocation::{RevocationError, RevocationStore};

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Admin role claimed by the token
    pub is_admin: bool,

    /// Whether the token came straight from a password login
    pub fresh: bool,

    /// Token ID, needed to revoke the token on logout
    pub jti: Uuid,

    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            is_admin: claims.is_admin,
            fresh: claims.fresh,
            jti: claims.jti,
            expires_at: claims.exp,
        }
    }
}

/// Error type for token authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Request does not contain an access token")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer, structure or token type is wrong
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token ID is on the revocation list
    #[error("Token has been revoked")]
    Revoked,

    /// Endpoint requires a fresh token
    #[error("Fresh token required")]
    NotFresh,

    /// Revocation list could not be consulted
    #[error(transparent)]
    Revocation(#[from] RevocationError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            JwtError::NotFresh => AuthError::NotFresh,
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Verifies a bearer token of the expected type
///
/// # Errors
///
/// Returns the first failing check as an [`AuthError`]
pub async fn authenticate(
    header: Option<&str>,
    secret: &str,
    expected: TokenType,
    revocations: &dyn RevocationStore,
) -> Result<Claims, AuthError> {
    let token = bearer_token(header)?;
    let claims = match expected {
        TokenType::Access => validate_access_token(token, secret)?,
        TokenType::Refresh => validate_refresh_token(token, secret)?,
    };

    if revocations.is_revoked(claims.jti).await? {
        return Err(AuthError::Revoked);
    }

    Ok(claims)
}
