//! Adapter implementations for auth ports and the HTTP transport.

pub mod argon2;
mod blocking_hasher;
pub mod http;
pub mod memory;
pub mod postgres;
