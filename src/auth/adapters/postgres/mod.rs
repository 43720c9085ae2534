//! `PostgreSQL` adapters for credential persistence.

mod models;
mod schema;
mod store;

pub use store::{CREATE_PRINCIPALS_SQL, CredentialPgPool, PostgresCredentialStore};
