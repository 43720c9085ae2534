//! Tokenward: bearer-token authentication with transparent refresh rotation.
//!
//! This crate authenticates HTTP callers using a short-lived access token and
//! a long-lived refresh token. When the access token has expired but the
//! refresh token is still valid, the access guard rotates both inline instead
//! of forcing the caller through a separate refresh round trip.
//!
//! # Architecture
//!
//! Tokenward follows hexagonal architecture principles:
//!
//! - **Domain**: Principals, token payloads, and credential sources with no
//!   infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for credential persistence and
//!   secret hashing
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`,
//!   Argon2) plus the axum transport
//!
//! # Modules
//!
//! - [`auth`]: Token codec, credential store contract, auth service, and
//!   access guard
//! - [`config`]: Immutable secret, TTL, and server configuration
//! - [`telemetry`]: Tracing subscriber installation

pub mod auth;
pub mod config;
pub mod telemetry;
