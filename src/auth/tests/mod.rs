//! Unit tests for the auth context.

pub(crate) mod support;
