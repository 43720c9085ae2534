//! Schema-isolated `PostgreSQL` fixtures.
//!
//! Tests run only when `TOKENWARD_TEST_DATABASE_URL` points at a reachable
//! server. Each fixture creates a throwaway schema, applies the principals
//! DDL inside it, and drops it again on teardown.

use diesel::Connection;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::sync::Arc;
use tokenward::auth::adapters::{
    argon2::Argon2SecretHasher,
    postgres::{CREATE_PRINCIPALS_SQL, PostgresCredentialStore},
};

/// Environment variable naming the server used by these tests.
pub const DATABASE_URL_VAR: &str = "TOKENWARD_TEST_DATABASE_URL";

/// Store type exercised by the `PostgreSQL` tests.
pub type PgStore = PostgresCredentialStore<Argon2SecretHasher, DefaultClock>;

/// A store bound to its own schema, dropped with the fixture.
pub struct TestDatabase {
    admin_url: String,
    schema: String,
    pub store: Arc<PgStore>,
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Ok(mut connection) = PgConnection::establish(&self.admin_url) {
            connection
                .batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
                .ok();
        }
    }
}

/// Opens a fresh schema, or returns `None` when no server is configured.
pub fn test_database() -> Option<TestDatabase> {
    let admin_url = std::env::var(DATABASE_URL_VAR).ok()?;
    let schema = format!("tokenward_{}", uuid::Uuid::new_v4().simple());

    let mut admin = PgConnection::establish(&admin_url).expect("connect to test database");
    admin
        .batch_execute(&format!("CREATE SCHEMA {schema}"))
        .expect("create schema");

    let separator = if admin_url.contains('?') { '&' } else { '?' };
    let scoped_url = format!("{admin_url}{separator}options=-c%20search_path%3D{schema}");
    let pool = Pool::builder()
        .max_size(4)
        .build(ConnectionManager::<PgConnection>::new(scoped_url))
        .expect("build pool");
    pool.get()
        .expect("pooled connection")
        .batch_execute(CREATE_PRINCIPALS_SQL)
        .expect("apply principals schema");

    let hasher = Argon2SecretHasher::with_cost(1024, 1, 1).expect("valid test parameters");
    let store = PostgresCredentialStore::new(pool, Arc::new(hasher), Arc::new(DefaultClock));
    Some(TestDatabase {
        admin_url,
        schema,
        store: Arc::new(store),
    })
}
