//! In-memory adapters for auth ports.

mod credential_store;

pub use credential_store::InMemoryCredentialStore;
