//! Bcrypt adapter for the [`PasswordHasher`] port.

use crate::domain::ports::{PasswordHasher, PasswordHasherError};

const BCRYPT_PREFIX: &str = "$2";

/// Password hasher backed by the `bcrypt` crate.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher with an explicit work factor.
    #[must_use]
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordHasherError> {
        bcrypt::hash(plain, self.cost).map_err(|error| PasswordHasherError::hash(error.to_string()))
    }

    fn is_hashed(&self, candidate: &str) -> bool {
        candidate.starts_with(BCRYPT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashes_verify_against_the_plain_text() {
        let hasher = BcryptPasswordHasher::with_cost(4);
        let hashed = hasher.hash("s3cret").expect("hash");

        assert!(hasher.is_hashed(&hashed));
        assert!(bcrypt::verify("s3cret", &hashed).expect("verify"));
    }

    #[rstest]
    #[case::bcrypt_2b("$2b$10$abcdefghijklmnopqrstuv", true)]
    #[case::bcrypt_2a("$2a$12$abcdefghijklmnopqrstuv", true)]
    #[case::plain("hunter2", false)]
    #[case::other_scheme("$argon2id$v=19$...", false)]
    fn recognises_bcrypt_prefix(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(BcryptPasswordHasher::default().is_hashed(candidate), expected);
    }
}
