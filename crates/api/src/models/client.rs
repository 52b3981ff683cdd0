//! Client domain types.

use chrono::{DateTime, Utc};

use salesdesk_core::{ClientId, Email, UserId};

/// A client owned by one seller.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub surname: String,
    pub company: String,
    /// Contact email (unique across all clients).
    pub email: Email,
    pub phone: Option<String>,
    /// Seller who registered the client and alone may access it.
    pub seller_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Data for a new client. The owner is always the calling seller.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: Email,
    pub phone: Option<String>,
}

/// Partial update of a client. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub company: Option<String>,
    pub email: Option<Email>,
    /// `Some(None)` clears the phone.
    pub phone: Option<Option<String>>,
}
