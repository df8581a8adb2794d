//! Test utilities for the crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled only for tests or with the `test-support` feature.

mod clock;
mod in_memory_erp;

pub use clock::FixedClock;
pub use in_memory_erp::InMemoryErpGateway;
