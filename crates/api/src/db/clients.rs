//! Client repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use salesdesk_core::{ClientId, Email, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{Client, ClientPatch, NewClient};

pub(super) const CLIENT_COLUMNS: &str = "id, name, surname, company, email, phone, seller_id, created_at";

#[derive(sqlx::FromRow)]
pub(super) struct ClientRow {
    id: ClientId,
    name: String,
    surname: String,
    company: String,
    email: String,
    phone: Option<String>,
    seller_id: UserId,
    created_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid client email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            surname: row.surname,
            company: row.company,
            email,
            phone: row.phone,
            seller_id: row.seller_id,
            created_at: row.created_at,
        })
    }
}

fn collect_clients(rows: Vec<ClientRow>) -> Result<Vec<Client>, RepositoryError> {
    rows.into_iter().map(Client::try_from).collect()
}

/// Repository for client database operations.
pub struct ClientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every client, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        collect_clients(rows)
    }

    /// List the clients owned by one seller, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            r"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE seller_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(seller_id)
        .fetch_all(self.pool)
        .await?;

        collect_clients(rows)
    }

    /// Get a client by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Client::try_from).transpose()
    }

    /// Get several clients at once (for batched loading).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ClientId]) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        collect_clients(rows)
    }

    /// Create a client owned by `seller_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email belongs to another client.
    pub async fn create(
        &self,
        seller_id: UserId,
        client: &NewClient,
    ) -> Result<Client, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r"
            INSERT INTO clients (name, surname, company, email, phone, seller_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIENT_COLUMNS}
            "
        ))
        .bind(&client.name)
        .bind(&client.surname)
        .bind(&client.company)
        .bind(client.email.as_str())
        .bind(client.phone.as_deref())
        .bind(seller_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "email belongs to a registered client", "unknown seller"))?;

        Client::try_from(row)
    }

    /// Apply a partial update. Returns `None` if the client does not exist.
    ///
    /// The owner never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email belongs to another client.
    pub async fn update(
        &self,
        id: ClientId,
        patch: &ClientPatch,
    ) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r"
            UPDATE clients
            SET name = COALESCE($2, name),
                surname = COALESCE($3, surname),
                company = COALESCE($4, company),
                email = COALESCE($5, email),
                phone = CASE WHEN $6 THEN $7 ELSE phone END
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.surname.as_deref())
        .bind(patch.company.as_deref())
        .bind(patch.email.as_ref().map(Email::as_str))
        .bind(patch.phone.is_some())
        .bind(patch.phone.as_ref().and_then(Option::as_deref))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "email belongs to a registered client", "invalid reference"))?;

        row.map(Client::try_from).transpose()
    }

    /// Delete a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client does not exist.
    /// Returns `RepositoryError::Conflict` if the client still has orders.
    pub async fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_write_error(e, "invalid reference", "client still has orders"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// The seller who owns a client, read on a transaction's connection.
///
/// The row is share-locked so the client cannot be deleted before the
/// transaction commits.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn seller_of(
    conn: &mut PgConnection,
    id: ClientId,
) -> Result<Option<UserId>, RepositoryError> {
    let seller = sqlx::query_scalar::<_, UserId>(
        "SELECT seller_id FROM clients WHERE id = $1 FOR SHARE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(seller)
}
