//! Ownership checks shared by every caller-scoped resource service.
//!
//! A resource with no owner is unclaimed and open to any authenticated
//! caller; once claimed, only the owner may touch it.

use tracing::warn;

use crate::shared::AppError;

/// Permits access when the resource is unclaimed or owned by the caller.
pub fn authorize_owner(resource_owner_id: Option<i64>, caller_id: i64) -> Result<(), AppError> {
    match resource_owner_id {
        None => Ok(()),
        Some(owner_id) if owner_id == caller_id => Ok(()),
        Some(owner_id) => {
            warn!(
                owner_id = owner_id,
                caller_id = caller_id,
                "Ownership check failed"
            );
            Err(AppError::Forbidden(
                "You do not own this resource".to_string(),
            ))
        }
    }
}

/// Permits an operation only when the caller is acting on their own
/// account, e.g. claiming a pet or listing their own pets.
pub fn authorize_self(target_user_id: i64, caller_id: i64) -> Result<(), AppError> {
    if target_user_id == caller_id {
        Ok(())
    } else {
        warn!(
            target_user_id = target_user_id,
            caller_id = caller_id,
            "Caller attempted to act on behalf of another user"
        );
        Err(AppError::Forbidden(
            "You may only perform this action for yourself".to_string(),
        ))
    }
}
