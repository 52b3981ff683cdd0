//! User domain types.

use chrono::{DateTime, Utc};

use salesdesk_core::{Email, UserId};

/// A seller account (domain type).
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// First name.
    pub name: String,
    /// Last name.
    pub surname: String,
    /// Sign-in email address (unique).
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Registration data for a new seller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}
