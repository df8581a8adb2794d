//! Driven port for one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing.
    pub enum PasswordHasherError {
        /// The hashing primitive failed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Port wrapping the password-hashing primitive.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `plain` for storage.
    fn hash(&self, plain: &str) -> Result<String, PasswordHasherError>;

    /// Whether `candidate` already carries this hasher's output prefix.
    fn is_hashed(&self, candidate: &str) -> bool;
}

impl From<PasswordHasherError> for crate::domain::Error {
    fn from(value: PasswordHasherError) -> Self {
        Self::internal(value.to_string())
    }
}
