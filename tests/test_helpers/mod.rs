//! Shared clock and service wiring for integration tests.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use secrecy::SecretString;
use std::sync::{Arc, Mutex, PoisonError};
use tokenward::auth::{
    adapters::{argon2::Argon2SecretHasher, memory::InMemoryCredentialStore},
    services::AuthService,
};
use tokenward::config::{AuthConfig, TokenPolicy};

/// Access-token lifetime used by [`test_config`].
pub const ACCESS_TTL_SECS: i64 = 60;
/// Refresh-token lifetime used by [`test_config`].
pub const REFRESH_TTL_SECS: i64 = 3_600;

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Moves the clock just past the access-token lifetime.
    pub fn expire_access(&self) {
        self.advance(Duration::seconds(ACCESS_TTL_SECS + 1));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 2, 8, 30, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory store driven by the manual clock.
pub type MemoryStore = InMemoryCredentialStore<Argon2SecretHasher, ManualClock>;
/// Auth service over [`MemoryStore`].
pub type MemoryService = AuthService<MemoryStore, ManualClock>;

/// Argon2 with the lowest cost the library accepts.
pub fn fast_hasher() -> Argon2SecretHasher {
    Argon2SecretHasher::with_cost(1024, 1, 1).expect("valid test parameters")
}

/// Short-lived policies with distinct secrets.
pub fn test_config() -> AuthConfig {
    AuthConfig::new(
        TokenPolicy::new(
            SecretString::from("integration-access-secret"),
            std::time::Duration::from_secs(ACCESS_TTL_SECS.unsigned_abs()),
        ),
        TokenPolicy::new(
            SecretString::from("integration-refresh-secret"),
            std::time::Duration::from_secs(REFRESH_TTL_SECS.unsigned_abs()),
        ),
    )
}

/// Builds an in-memory auth service sharing `clock`.
pub fn memory_service(config: AuthConfig, clock: &ManualClock) -> MemoryService {
    let store = Arc::new(InMemoryCredentialStore::new(
        Arc::new(fast_hasher()),
        Arc::new(clock.clone()),
    ));
    AuthService::new(store, Arc::new(config), Arc::new(clock.clone()))
}
