//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **erp**: the ERP JSON gateway, its token cache, and wire codecs.
//! - **hashing**: bcrypt password hashing.
//!
//! Adapters translate between domain types and wire representations; they
//! contain no business logic.

pub mod erp;
pub mod hashing;
