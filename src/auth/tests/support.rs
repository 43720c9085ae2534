//! Shared fixtures for auth unit tests.

use crate::auth::{
    adapters::{argon2::Argon2SecretHasher, memory::InMemoryCredentialStore},
    domain::RequestCredentials,
    domain::{RefreshTokenSources, SecretHash, TokenPair},
    ports::{SecretHashError, SecretHasher},
    services::AuthService,
};
use crate::config::{AuthConfig, TokenPolicy};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use secrecy::SecretString;
use std::sync::{Arc, Mutex, mpsc};

/// Access-token lifetime used by the test configuration.
pub const ACCESS_TTL_SECS: i64 = 60;
/// Refresh-token lifetime used by the test configuration.
pub const REFRESH_TTL_SECS: i64 = 3_600;

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at(
            Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
                .single()
                .expect("valid start time"),
        )
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

pub type TestStore = InMemoryCredentialStore<Argon2SecretHasher, ManualClock>;
pub type TestService = AuthService<TestStore, ManualClock>;

/// Argon2 with the lowest cost the library accepts.
pub fn fast_hasher() -> Argon2SecretHasher {
    Argon2SecretHasher::with_cost(1024, 1, 1).expect("valid test parameters")
}

/// How long a [`GatedHasher`] waits for its gate before giving up.
pub const GATE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Hasher that blocks its calling thread until the gate is opened once per call.
///
/// A call that never sees the gate open within [`GATE_TIMEOUT`] fails.
pub struct GatedHasher {
    inner: Argon2SecretHasher,
    gate: Mutex<mpsc::Receiver<()>>,
}

impl GatedHasher {
    /// Returns the hasher and the sender that opens its gate.
    pub fn new() -> (Self, mpsc::Sender<()>) {
        let (opener, gate) = mpsc::channel();
        let hasher = Self {
            inner: fast_hasher(),
            gate: Mutex::new(gate),
        };
        (hasher, opener)
    }

    fn pass_gate(&self) -> bool {
        self.gate
            .lock()
            .expect("gate lock")
            .recv_timeout(GATE_TIMEOUT)
            .is_ok()
    }
}

impl SecretHasher for GatedHasher {
    fn hash(&self, plaintext: &str) -> Result<SecretHash, SecretHashError> {
        if !self.pass_gate() {
            return Err(SecretHashError("gate stayed closed".to_owned()));
        }
        self.inner.hash(plaintext)
    }

    fn verify(&self, hash: &SecretHash, plaintext: &str) -> bool {
        self.pass_gate() && self.inner.verify(hash, plaintext)
    }
}

/// Short-lived policies with distinct secrets.
pub fn test_config() -> AuthConfig {
    AuthConfig::new(
        TokenPolicy::new(
            SecretString::from("test-access-secret"),
            std::time::Duration::from_secs(ACCESS_TTL_SECS.unsigned_abs()),
        ),
        TokenPolicy::new(
            SecretString::from("test-refresh-secret"),
            std::time::Duration::from_secs(REFRESH_TTL_SECS.unsigned_abs()),
        ),
    )
}

/// Service, store, and clock wired together.
pub struct Harness {
    pub clock: ManualClock,
    pub store: Arc<TestStore>,
    pub service: TestService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AuthConfig) -> Self {
        let clock = ManualClock::default();
        let store = Arc::new(InMemoryCredentialStore::new(
            Arc::new(fast_hasher()),
            Arc::new(clock.clone()),
        ));
        let service = AuthService::new(
            Arc::clone(&store),
            Arc::new(config),
            Arc::new(clock.clone()),
        );
        Self {
            clock,
            store,
            service,
        }
    }

    /// Moves the clock just past the access-token lifetime.
    pub fn expire_access(&self) {
        self.clock.advance(Duration::seconds(ACCESS_TTL_SECS + 1));
    }

    /// Moves the clock just past the refresh-token lifetime.
    pub fn expire_refresh(&self) {
        self.clock.advance(Duration::seconds(REFRESH_TTL_SECS + 1));
    }
}

/// Credentials presenting `tokens` as bearer plus plain cookie.
pub fn presenting(tokens: &TokenPair) -> RequestCredentials {
    RequestCredentials::new()
        .with_access_token(tokens.access_token.clone())
        .with_refresh_sources(RefreshTokenSources::new().with_cookie(tokens.refresh_token.clone()))
}
