//! Shared world state for token rotation BDD scenarios.

use crate::test_helpers::{ManualClock, MemoryService, memory_service, test_config};
use rstest::fixture;
use tokenward::auth::{
    domain::TokenPair,
    services::{AuthError, AuthSession, GuardDecision},
};

/// Scenario state threaded through the rotation steps.
pub struct RotationWorld {
    pub clock: ManualClock,
    pub service: MemoryService,
    pub first_session: Option<AuthSession>,
    pub latest_tokens: Option<TokenPair>,
    pub last_decision: Option<GuardDecision>,
    pub last_refresh: Option<Result<AuthSession, AuthError>>,
}

impl RotationWorld {
    /// Returns the session opened at sign-up.
    pub fn first_session(&self) -> Result<&AuthSession, eyre::Report> {
        self.first_session
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no principal has signed up"))
    }
}

/// Fixture providing a fresh world with an in-memory store.
#[fixture]
pub fn world() -> RotationWorld {
    let clock = ManualClock::default();
    let service = memory_service(test_config(), &clock);
    RotationWorld {
        clock,
        service,
        first_session: None,
        latest_tokens: None,
        last_decision: None,
        last_refresh: None,
    }
}

/// Runs an async operation from a synchronous step.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
