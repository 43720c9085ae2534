//! Port contracts for credential persistence and secret hashing.
//!
//! Ports define infrastructure-agnostic interfaces used by auth services.

pub mod credential_store;
pub mod secret_hasher;

pub use credential_store::{CredentialStore, CredentialStoreError, CredentialStoreResult};
pub use secret_hasher::{SecretHashError, SecretHasher};
