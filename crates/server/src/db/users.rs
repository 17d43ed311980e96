//! User repository: lookup, login upsert and locked pantry writes.
//!
//! Queries are built at runtime with `sqlx::query_as` and bound parameters.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use pantry_manager_core::{
    Email, LookupChain, LookupKey, LookupStep, PantryItem, UserId, UserProfile,
};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, photo_url, auth_uid, profile, pantry, created_at, updated_at";

const AUTH_UID_TAKEN: &str = "auth uid is already linked to another user";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    photo_url: Option<String>,
    auth_uid: Option<String>,
    profile: Json<serde_json::Value>,
    pantry: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let profile: UserProfile = serde_json::from_value(row.profile.0).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid profile for user {}: {e}", row.id))
        })?;
        let pantry: Vec<PantryItem> = serde_json::from_value(row.pantry.0).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid pantry for user {}: {e}", row.id))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            photo_url: row.photo_url,
            auth_uid: row.auth_uid,
            profile,
            pantry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Sign-in details reported by the client after provider authentication.
#[derive(Debug, Clone)]
pub struct LoginDetails {
    /// Display name from the provider.
    pub name: String,
    /// Email from the provider.
    pub email: Email,
    /// Avatar URL from the provider.
    pub photo_url: Option<String>,
    /// Provider UID.
    pub auth_uid: Option<String>,
}

/// Outcome of a locked mutation.
#[derive(Debug)]
pub enum Change<T> {
    /// Persist the user's pantry and profile, then return `T`.
    Write(T),
    /// Roll back without writing, then return `T`.
    Skip(T),
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by walking the lookup chain.
    ///
    /// Returns the first match; later steps are not queried.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored data is invalid.
    pub async fn find(&self, chain: &LookupChain) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        find_in(&mut conn, chain, false).await
    }

    /// Create the user on first sign-in, or link a changed provider UID.
    ///
    /// Users are matched by email. An existing user's name and photo are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the UID belongs to another user.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn upsert_login(&self, login: &LoginDetails) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO pantry.app_user (id, name, email, photo_url, auth_uid)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (email) DO NOTHING
             RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::generate().as_uuid())
        .bind(&login.name)
        .bind(login.email.as_str())
        .bind(login.photo_url.as_deref())
        .bind(login.auth_uid.as_deref())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, AUTH_UID_TAKEN))?;

        if let Some(row) = inserted {
            let user: User = row.try_into()?;
            tx.commit().await?;
            tracing::info!(user_id = %user.id, "Created user on first sign-in");
            return Ok(user);
        }

        let existing = fetch_by_key(&mut tx, &LookupKey::Email(login.email.clone()), true)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let row = match login.auth_uid.as_deref() {
            Some(uid) if existing.auth_uid.as_deref() != Some(uid) => {
                tracing::info!(user_id = %existing.id, "Linking new auth uid to user");
                sqlx::query_as::<_, UserRow>(&format!(
                    "UPDATE pantry.app_user SET auth_uid = $2, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {USER_COLUMNS}"
                ))
                .bind(existing.id)
                .bind(uid)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryError::conflict_on_unique(e, AUTH_UID_TAKEN))?
            }
            _ => existing,
        };

        let user: User = row.try_into()?;
        tx.commit().await?;
        Ok(user)
    }

    /// Lock the user's row, run `mutate`, and persist the result.
    ///
    /// The row stays locked (`SELECT ... FOR UPDATE`) from read to write, so
    /// concurrent mutations of one user are applied one after another. Returns
    /// `None` if no user matches the chain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored data is invalid.
    pub async fn with_locked<T, F>(
        &self,
        chain: &LookupChain,
        mutate: F,
    ) -> Result<Option<(User, T)>, RepositoryError>
    where
        F: FnOnce(&mut User) -> Change<T>,
    {
        let mut tx = self.pool.begin().await?;

        let Some(mut user) = find_in(&mut tx, chain, true).await? else {
            return Ok(None);
        };

        match mutate(&mut user) {
            Change::Skip(value) => {
                tx.rollback().await?;
                Ok(Some((user, value)))
            }
            Change::Write(value) => {
                let pantry = serde_json::to_value(&user.pantry)
                    .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
                let profile = serde_json::to_value(&user.profile)
                    .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

                let row = sqlx::query_as::<_, UserRow>(&format!(
                    "UPDATE pantry.app_user
                     SET pantry = $2, profile = $3, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {USER_COLUMNS}"
                ))
                .bind(user.id.as_uuid())
                .bind(Json(pantry))
                .bind(Json(profile))
                .fetch_one(&mut *tx)
                .await?;

                // Decode before committing so an unreadable document rolls back.
                let saved: User = row.try_into()?;
                tx.commit().await?;
                Ok(Some((saved, value)))
            }
        }
    }
}

/// Walk the chain on `conn`, optionally locking the matched row.
async fn find_in(
    conn: &mut PgConnection,
    chain: &LookupChain,
    lock: bool,
) -> Result<Option<User>, RepositoryError> {
    for key in chain.keys() {
        if let Some(row) = fetch_by_key(conn, key, lock).await? {
            let step: LookupStep = key.step();
            tracing::debug!(%step, user_id = %row.id, "Resolved user");
            return row.try_into().map(Some);
        }
    }
    tracing::debug!(identifier = chain.identifier(), "No user matched lookup chain");
    Ok(None)
}

async fn fetch_by_key(
    conn: &mut PgConnection,
    key: &LookupKey,
    lock: bool,
) -> Result<Option<UserRow>, RepositoryError> {
    let column = match key {
        LookupKey::Id(_) => "id",
        LookupKey::AuthUid(_) => "auth_uid",
        LookupKey::Email(_) => "email",
    };
    let lock_clause = if lock { " FOR UPDATE" } else { "" };
    let sql = format!("SELECT {USER_COLUMNS} FROM pantry.app_user WHERE {column} = $1{lock_clause}");

    let query = sqlx::query_as::<_, UserRow>(&sql);
    let query = match key {
        LookupKey::Id(id) => query.bind(id.as_uuid()),
        LookupKey::AuthUid(uid) => query.bind(uid.as_str()),
        LookupKey::Email(email) => query.bind(email.as_str()),
    };

    Ok(query.fetch_optional(&mut *conn).await?)
}
