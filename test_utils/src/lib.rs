//! Shared fixtures and quickcheck generators for the integration tests and benches.

pub mod fixtures;
pub mod generator;
