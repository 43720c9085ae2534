//! Diesel row models for principal persistence.

use super::schema::principals;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for principal records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = principals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PrincipalRow {
    /// Principal identifier.
    pub id: uuid::Uuid,
    /// Unique login name.
    pub username: String,
    /// Encoded login secret hash.
    pub secret_hash: String,
    /// Current refresh-token hash.
    pub refresh_token_hash: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert model for principal records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = principals)]
pub struct NewPrincipalRow {
    /// Principal identifier.
    pub id: uuid::Uuid,
    /// Unique login name.
    pub username: String,
    /// Encoded login secret hash.
    pub secret_hash: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
