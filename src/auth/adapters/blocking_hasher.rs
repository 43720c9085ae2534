//! Runs secret hashing on the blocking thread pool.
//!
//! Password hashes are deliberately slow; calling them inline would stall
//! the async worker serving other requests.

use crate::auth::{
    domain::SecretHash,
    ports::{SecretHashError, SecretHasher},
};
use std::sync::Arc;
use tracing::error;

/// Hashes `plaintext` with `hasher` off the async worker.
pub(crate) async fn hash_secret<H>(
    hasher: &Arc<H>,
    plaintext: &str,
) -> Result<SecretHash, SecretHashError>
where
    H: SecretHasher,
{
    let engine = Arc::clone(hasher);
    let owned = plaintext.to_owned();
    tokio::task::spawn_blocking(move || engine.hash(&owned))
        .await
        .map_err(|err| SecretHashError(err.to_string()))?
}

/// Verifies `plaintext` against `hash` off the async worker.
///
/// A failed blocking task counts as a mismatch.
pub(crate) async fn verify_secret<H>(hasher: &Arc<H>, hash: &SecretHash, plaintext: &str) -> bool
where
    H: SecretHasher,
{
    let engine = Arc::clone(hasher);
    let stored = hash.clone();
    let owned = plaintext.to_owned();
    tokio::task::spawn_blocking(move || engine.verify(&stored, &owned))
        .await
        .unwrap_or_else(|err| {
            error!(error = %err, "secret verification task failed");
            false
        })
}
