//! Authentication and refresh-token rotation.
//!
//! Principals sign up and log in to receive a token pair. Protected requests
//! pass through the [`services::AccessGuard`], which verifies the access
//! token and, once it has expired, verifies and rotates the refresh token in
//! a single compare-and-swap against the credential store. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Token signing and verification in [`codec`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod codec;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
