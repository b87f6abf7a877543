/// JWT token generation and validation module
///
/// Tokens are signed using HS256 (HMAC-SHA256) and carry the user identity,
/// the admin flag, a freshness flag and a unique `jti` used as revocation key.
///
/// # Token Types
///
/// - **Access Token**: Short-lived (15 minutes by default), used for API authentication
/// - **Refresh Token**: Long-lived (30 days by default), exchanged once for a new access token
///
/// # Example
///
/// ```
/// use stores_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(7, false, TokenType::Access, true);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_access_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, 7);
/// assert!(validated.fresh);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every token
pub const ISSUER: &str = "stores-api";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is of the other type (access vs refresh)
    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },

    /// Operation requires a token issued directly by a login
    #[error("Token is not fresh")]
    NotFresh,
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token
    Access,

    /// Refresh token
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::minutes(15),
            TokenType::Refresh => Duration::days(30),
        }
    }

    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "stores-api")
/// - `iat` / `nbf` / `exp`: Issued at, not before, expiration (Unix timestamps)
/// - `jti`: Unique token ID, the key of the revocation list
///
/// # Custom Claims
///
/// - `token_type`: Access or refresh token
/// - `fresh`: True only for access tokens issued by a password login
/// - `is_admin`: Administrator role of the subject at issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: i64,

    /// Issuer - Always "stores-api"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token ID
    pub jti: Uuid,

    /// Token type (custom claim)
    pub token_type: TokenType,

    /// Freshness (custom claim)
    pub fresh: bool,

    /// Admin role (custom claim)
    pub is_admin: bool,
}

impl Claims {
    /// Creates new claims with the default expiration for the token type
    ///
    /// Refresh tokens are never fresh, whatever `fresh` says.
    pub fn new(user_id: i64, is_admin: bool, token_type: TokenType, fresh: bool) -> Self {
        Self::with_expiration(
            user_id,
            is_admin,
            token_type,
            fresh,
            token_type.default_expiration(),
        )
    }

    /// Creates claims with custom expiration
    ///
    /// # Example
    ///
    /// ```
    /// use stores_shared::auth::jwt::{Claims, TokenType};
    /// use chrono::Duration;
    ///
    /// let claims = Claims::with_expiration(1, true, TokenType::Access, false, Duration::hours(1));
    /// assert!(!claims.is_expired());
    /// ```
    pub fn with_expiration(
        user_id: i64,
        is_admin: bool,
        token_type: TokenType,
        fresh: bool,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
            fresh: fresh && token_type == TokenType::Access,
            is_admin,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Fails with `JwtError::NotFresh` unless the token came from a password login
    pub fn require_fresh(&self) -> Result<(), JwtError> {
        if self.fresh {
            Ok(())
        } else {
            Err(JwtError::NotFresh)
        }
    }
}

/// Creates a JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies signature, expiration, not-before and issuer. Revocation is not
/// checked here; see [`crate::auth::revocation`].
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens and
/// `JwtError::ValidationError` for every other failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

fn validate_token_of_type(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }

    Ok(claims)
}

/// Validates token and checks it's an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_token_of_type(token, secret, TokenType::Access)
}

/// Validates token and checks it's a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_token_of_type(token, secret, TokenType::Refresh)
}

/// Token lifetimes used when issuing a login token pair
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: TokenType::Access.default_expiration(),
            refresh: TokenType::Refresh.default_expiration(),
        }
    }
}

/// A signed access/refresh pair returned by a password login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues the token pair for a successful password login
///
/// The access token is fresh; the refresh token is not.
pub fn issue_login_tokens(
    user_id: i64,
    is_admin: bool,
    lifetimes: TokenLifetimes,
    secret: &str,
) -> Result<TokenPair, JwtError> {
    let access = Claims::with_expiration(user_id, is_admin, TokenType::Access, true, lifetimes.access);
    let refresh =
        Claims::with_expiration(user_id, is_admin, TokenType::Refresh, false, lifetimes.refresh);

    Ok(TokenPair {
        access_token: create_token(&access, secret)?,
        refresh_token: create_token(&refresh, secret)?,
    })
}

/// Issues the non-fresh access token handed out in exchange for a refresh token
pub fn issue_refreshed_access_token(
    user_id: i64,
    is_admin: bool,
    lifetime: Duration,
    secret: &str,
) -> Result<String, JwtError> {
    let claims = Claims::with_expiration(user_id, is_admin, TokenType::Access, false, lifetime);
    create_token(&claims, secret)
}
