use uuid::Uuid;

use crate::error::AppError;

/// Checks that the authenticated caller is the owner a request refers to.
///
/// Returns `Err(AppError::Forbidden)` on mismatch. The caller must propagate it
/// (normally with `?`) before touching the resource; the check sets no response
/// by itself.
pub fn authorize_owner(caller: Uuid, owner: Uuid) -> Result<(), AppError> {
    if caller == owner {
        Ok(())
    } else {
        log::debug!("authorization failed: caller {} is not owner {}", caller, owner);
        Err(AppError::Forbidden)
    }
}

/// Same as [`authorize_owner`] for an owner id taken verbatim from a path or body.
/// A value that is not a valid id can never match the caller.
pub fn authorize_owner_str(caller: Uuid, owner: &str) -> Result<(), AppError> {
    match Uuid::parse_str(owner) {
        Ok(owner) => authorize_owner(caller, owner),
        Err(_) => Err(AppError::Forbidden),
    }
}
