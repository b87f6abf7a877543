/// Authorization checks
///
/// Access control is coarse: any authenticated user may read and write
/// stores, items and tags; deleting items and users needs the admin role.
/// The role travels in the token's `is_admin` claim.

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Operation is reserved for administrators
    #[error("Admin privilege required.")]
    AdminRequired,
}

/// Fails with `AuthzError::AdminRequired` unless the caller holds the admin role
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}
