//! `PostgreSQL` credential store.

use super::{
    models::{NewPrincipalRow, PrincipalRow},
    schema::principals,
};
use crate::auth::{
    adapters::blocking_hasher,
    domain::{PersistedPrincipalData, Principal, PrincipalId, RefreshTokenHash, SecretHash, Username},
    ports::{CredentialStore, CredentialStoreError, CredentialStoreResult, SecretHasher},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mockable::Clock;
use std::sync::Arc;

/// `PostgreSQL` connection pool type used by credential adapters.
pub type CredentialPgPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent DDL creating the `principals` table.
pub const CREATE_PRINCIPALS_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_principals/up.sql");

/// `PostgreSQL`-backed credential store.
///
/// Refresh-token rotation is a single conditional `UPDATE` keyed on the
/// previous hash, so concurrent rotations are arbitrated by the database.
pub struct PostgresCredentialStore<H, C>
where
    H: SecretHasher,
    C: Clock + Send + Sync,
{
    pool: CredentialPgPool,
    hasher: Arc<H>,
    clock: Arc<C>,
}

impl<H, C> PostgresCredentialStore<H, C>
where
    H: SecretHasher,
    C: Clock + Send + Sync,
{
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CredentialPgPool, hasher: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            pool,
            hasher,
            clock,
        }
    }

    /// Creates the `principals` table when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Persistence`] when the DDL fails.
    pub async fn ensure_schema(&self) -> CredentialStoreResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(CREATE_PRINCIPALS_SQL)
                .map_err(CredentialStoreError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> CredentialStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CredentialStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(CredentialStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(CredentialStoreError::persistence)?
    }
}

#[async_trait]
impl<H, C> CredentialStore for PostgresCredentialStore<H, C>
where
    H: SecretHasher,
    C: Clock + Send + Sync,
{
    async fn find_by_id(&self, id: PrincipalId) -> CredentialStoreResult<Option<Principal>> {
        self.run_blocking(move |connection| {
            let row = principals::table
                .filter(principals::id.eq(id.into_inner()))
                .filter(principals::deleted_at.is_null())
                .select(PrincipalRow::as_select())
                .first::<PrincipalRow>(connection)
                .optional()
                .map_err(CredentialStoreError::persistence)?;
            row.map(row_to_principal).transpose()
        })
        .await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> CredentialStoreResult<Option<Principal>> {
        let lookup = username.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = principals::table
                .filter(principals::username.eq(lookup))
                .filter(principals::deleted_at.is_null())
                .select(PrincipalRow::as_select())
                .first::<PrincipalRow>(connection)
                .optional()
                .map_err(CredentialStoreError::persistence)?;
            row.map(row_to_principal).transpose()
        })
        .await
    }

    async fn create_principal(
        &self,
        username: &Username,
        secret: &str,
    ) -> CredentialStoreResult<Principal> {
        let secret_hash = blocking_hasher::hash_secret(&self.hasher, secret).await?;
        let principal = Principal::new(username.clone(), secret_hash, &*self.clock);
        let new_row = NewPrincipalRow {
            id: principal.id().into_inner(),
            username: username.as_str().to_owned(),
            secret_hash: principal.secret_hash().as_str().to_owned(),
            created_at: principal.created_at(),
            updated_at: principal.updated_at(),
        };
        let taken = username.clone();

        self.run_blocking(move |connection| {
            diesel::insert_into(principals::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CredentialStoreError::AlreadyExists(taken)
                    }
                    _ => CredentialStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await?;
        Ok(principal)
    }

    async fn set_refresh_token(
        &self,
        id: PrincipalId,
        token: Option<&str>,
    ) -> CredentialStoreResult<()> {
        let hash = token.map(|raw| RefreshTokenHash::of(raw).as_str().to_owned());
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                principals::table
                    .filter(principals::id.eq(id.into_inner()))
                    .filter(principals::deleted_at.is_null()),
            )
            .set((
                principals::refresh_token_hash.eq(hash),
                principals::updated_at.eq(now),
            ))
            .execute(connection)
            .map_err(CredentialStoreError::persistence)?;
            if updated == 0 {
                return Err(CredentialStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn rotate_refresh_token(
        &self,
        id: PrincipalId,
        presented: &str,
        replacement: &str,
    ) -> CredentialStoreResult<()> {
        let expected = RefreshTokenHash::of(presented).as_str().to_owned();
        let next = RefreshTokenHash::of(replacement).as_str().to_owned();
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                principals::table
                    .filter(principals::id.eq(id.into_inner()))
                    .filter(principals::deleted_at.is_null())
                    .filter(principals::refresh_token_hash.eq(expected)),
            )
            .set((
                principals::refresh_token_hash.eq(Some(next)),
                principals::updated_at.eq(now),
            ))
            .execute(connection)
            .map_err(CredentialStoreError::persistence)?;
            if updated == 1 {
                return Ok(());
            }

            // Zero rows: either the hash moved on or the principal is gone.
            let live = principals::table
                .filter(principals::id.eq(id.into_inner()))
                .filter(principals::deleted_at.is_null())
                .select(principals::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(CredentialStoreError::persistence)?;
            Err(live.map_or(CredentialStoreError::NotFound(id), |_| {
                CredentialStoreError::RefreshTokenMismatch(id)
            }))
        })
        .await
    }

    async fn verify_secret(&self, principal: &Principal, secret: &str) -> bool {
        blocking_hasher::verify_secret(&self.hasher, principal.secret_hash(), secret).await
    }

    async fn soft_delete(&self, id: PrincipalId) -> CredentialStoreResult<()> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                principals::table
                    .filter(principals::id.eq(id.into_inner()))
                    .filter(principals::deleted_at.is_null()),
            )
            .set((
                principals::deleted_at.eq(Some(now)),
                principals::refresh_token_hash.eq(None::<String>),
                principals::updated_at.eq(now),
            ))
            .execute(connection)
            .map_err(CredentialStoreError::persistence)?;
            if updated == 0 {
                return Err(CredentialStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn restore(&self, id: PrincipalId) -> CredentialStoreResult<Principal> {
        let now = self.clock.utc();
        self.run_blocking(move |connection| {
            let row = diesel::update(
                principals::table
                    .filter(principals::id.eq(id.into_inner()))
                    .filter(principals::deleted_at.is_not_null()),
            )
            .set((
                principals::deleted_at.eq(None::<chrono::DateTime<chrono::Utc>>),
                principals::updated_at.eq(now),
            ))
            .returning(PrincipalRow::as_returning())
            .get_result::<PrincipalRow>(connection)
            .optional()
            .map_err(CredentialStoreError::persistence)?;
            row.map(row_to_principal)
                .transpose()?
                .ok_or(CredentialStoreError::NotFound(id))
        })
        .await
    }
}

fn row_to_principal(row: PrincipalRow) -> CredentialStoreResult<Principal> {
    let PrincipalRow {
        id,
        username,
        secret_hash,
        refresh_token_hash,
        created_at,
        updated_at,
        deleted_at,
    } = row;

    let data = PersistedPrincipalData {
        id: PrincipalId::from_uuid(id),
        username: Username::new(username).map_err(CredentialStoreError::persistence)?,
        secret_hash: SecretHash::new(secret_hash),
        refresh_token_hash: refresh_token_hash.map(RefreshTokenHash::from_persisted),
        created_at,
        updated_at,
        deleted_at,
    };
    Ok(Principal::from_persisted(data))
}
