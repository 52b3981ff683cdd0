//! Clients, each owned by the seller who registered them.

use sqlx::PgPool;

use salesdesk_core::{ClientId, UserId};

use super::{ensure_owner, optional_text, required_text};
use crate::db::RepositoryError;
use crate::db::clients::ClientRepository;
use crate::error::{AppError, Result};
use crate::models::{Client, ClientPatch, NewClient};

/// Client CRUD with ownership checks.
pub struct ClientService<'a> {
    clients: ClientRepository<'a>,
}

impl<'a> ClientService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool),
        }
    }

    /// Every client of every seller.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Client>> {
        Ok(self.clients.list_all().await?)
    }

    /// The clients owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_for_seller(&self, seller: UserId) -> Result<Vec<Client>> {
        Ok(self.clients.list_by_seller(seller).await?)
    }

    /// Get a client owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the client does not exist.
    /// Returns `AppError::Forbidden` if another seller owns it.
    pub async fn get(&self, seller: UserId, id: ClientId) -> Result<Client> {
        let client = self
            .clients
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_owner(client.seller_id, seller, "client")?;
        Ok(client)
    }

    /// Register a client owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for blank fields.
    /// Returns `AppError::Database` (code `CONFLICT`) if the email is taken.
    pub async fn create(&self, seller: UserId, client: NewClient) -> Result<Client> {
        let client = NewClient {
            name: required_text(&client.name, "name")?,
            surname: required_text(&client.surname, "surname")?,
            company: required_text(&client.company, "company")?,
            email: client.email,
            phone: normalize_phone(client.phone),
        };

        let created = self.clients.create(seller, &client).await?;
        tracing::info!(client_id = %created.id, seller_id = %seller, "Client created");
        Ok(created)
    }

    /// Change some fields of a client owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound`, `AppError::Forbidden`, or
    /// `AppError::BadRequest` as for [`Self::get`] and [`Self::create`].
    pub async fn update(&self, seller: UserId, id: ClientId, patch: ClientPatch) -> Result<Client> {
        self.get(seller, id).await?;

        let patch = ClientPatch {
            name: optional_text(patch.name.as_deref(), "name")?,
            surname: optional_text(patch.surname.as_deref(), "surname")?,
            company: optional_text(patch.company.as_deref(), "company")?,
            email: patch.email,
            phone: patch.phone.map(normalize_phone),
        };

        let updated = self
            .clients
            .update(id, &patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(client_id = %id, seller_id = %seller, "Client updated");
        Ok(updated)
    }

    /// Delete a client owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` or `AppError::Forbidden` as for
    /// [`Self::get`], and `CONFLICT` if the client still has orders.
    pub async fn delete(&self, seller: UserId, id: ClientId) -> Result<()> {
        self.get(seller, id).await?;

        self.clients.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => not_found(id),
            other => other.into(),
        })?;
        tracing::info!(client_id = %id, seller_id = %seller, "Client deleted");
        Ok(())
    }
}

pub(crate) fn not_found(id: ClientId) -> AppError {
    AppError::NotFound(format!("client {id} not found"))
}

fn normalize_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_phone_in_patch_clears_it() {
        let patch = ClientPatch {
            phone: Some(Some("  ".into())),
            ..ClientPatch::default()
        };
        assert_eq!(patch.phone.map(normalize_phone), Some(None));

        let untouched = ClientPatch::default();
        assert_eq!(untouched.phone.map(normalize_phone), None);
    }

    #[test]
    fn test_blank_phone_is_dropped() {
        assert_eq!(normalize_phone(Some("   ".into())), None);
        assert_eq!(normalize_phone(None), None);
        assert_eq!(
            normalize_phone(Some(" 555-0100 ".into())),
            Some("555-0100".to_owned())
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found(ClientId::new(9));
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.client_message(), "client 9 not found");
    }
}
