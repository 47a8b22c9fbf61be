use auth::Identity;
use auth::Role;
use thiserror::Error;

/// Authenticated caller refused access to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Insufficient role for this resource")]
    InsufficientRole,

    #[error("You can only access your own profile")]
    NotOwner,
}

/// Require the caller to hold at least one of `required`.
///
/// An empty role set places no restriction.
///
/// # Errors
/// * `InsufficientRole` - Caller's roles do not intersect `required`
pub fn require_any_role(identity: &Identity, required: &[Role]) -> Result<(), AccessError> {
    if required.is_empty() || identity.has_any_role(required) {
        Ok(())
    } else {
        Err(AccessError::InsufficientRole)
    }
}

/// Require the caller to be the owner of `target_id` or an ADMIN.
///
/// # Errors
/// * `NotOwner` - Caller is neither the target user nor an ADMIN
pub fn require_self_or_admin(identity: &Identity, target_id: &str) -> Result<(), AccessError> {
    if identity.is_admin() || identity.user_id == target_id {
        Ok(())
    } else {
        Err(AccessError::NotOwner)
    }
}
