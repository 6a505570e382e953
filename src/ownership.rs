use uuid::Uuid;

use crate::error::ApiError;

/// Records that belong to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Refuses mutation of records the acting user does not own.
///
/// Callers fetch by id first (missing records are `NotFound`), then guard
/// before touching anything, so not-found and not-yours stay distinct.
pub fn require_owner<T: Owned>(record: &T, user_id: Uuid) -> Result<(), ApiError> {
    if record.owner_id() != user_id {
        return Err(ApiError::Forbidden(
            "you do not have permission to modify this record".into(),
        ));
    }
    Ok(())
}
