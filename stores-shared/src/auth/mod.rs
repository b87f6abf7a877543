/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access/refresh token issuance and validation
/// - [`revocation`]: Revoked token list (logout, spent refresh tokens)
/// - [`middleware`]: Bearer token verification and the request auth context
/// - [`authorization`]: Admin role checks
///
/// # Example
///
/// ```no_run
/// use stores_shared::auth::password::{hash_password, verify_password};
/// use stores_shared::auth::jwt::{issue_login_tokens, TokenLifetimes};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = issue_login_tokens(1, true, TokenLifetimes::default(), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod revocation;
