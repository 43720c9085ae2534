//! Argon2id implementation of the secret hashing port.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::{RngCore, rngs::OsRng};

use crate::auth::{
    domain::SecretHash,
    ports::{SecretHashError, SecretHasher},
};

const SALT_LENGTH: usize = 16;

/// Argon2id secret hasher producing PHC-format strings.
#[derive(Debug, Clone)]
pub struct Argon2SecretHasher {
    engine: Argon2<'static>,
}

impl Argon2SecretHasher {
    /// Creates a hasher with the library's recommended cost parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Creates a hasher with explicit memory (KiB), iteration, and lane
    /// costs. Low costs keep test suites fast.
    ///
    /// # Errors
    ///
    /// Returns [`SecretHashError`] when the parameters are out of range.
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, SecretHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| SecretHashError(err.to_string()))?;
        Ok(Self {
            engine: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2SecretHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretHasher for Argon2SecretHasher {
    fn hash(&self, plaintext: &str) -> Result<SecretHash, SecretHashError> {
        let mut salt_bytes = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|err| SecretHashError(err.to_string()))?;
        let encoded = self
            .engine
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| SecretHashError(err.to_string()))?
            .to_string();
        Ok(SecretHash::new(encoded))
    }

    fn verify(&self, hash: &SecretHash, plaintext: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash.as_str()) else {
            return false;
        };
        self.engine
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
