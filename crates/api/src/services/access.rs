//! Ownership checks for seller-owned records.

use salesdesk_core::UserId;

use crate::error::{AppError, Result};

/// Allow access only when `viewer` is the seller who owns the record.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the ids differ.
pub fn ensure_owner(owner: UserId, viewer: UserId, resource: &str) -> Result<()> {
    if owner == viewer {
        return Ok(());
    }

    tracing::warn!(
        owner_id = %owner,
        viewer_id = %viewer,
        resource,
        "Access to another seller's record denied"
    );
    Err(AppError::Forbidden(format!(
        "you do not have access to this {resource}"
    )))
}
