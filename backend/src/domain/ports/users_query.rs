//! Driving port for user lookups.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every user, capped at the ERP page size.
    async fn get_all(&self) -> Result<Vec<User>, Error>;

    /// Users awaiting approval.
    async fn get_pending(&self) -> Result<Vec<User>, Error>;

    /// One user by key.
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, Error>;

    /// Case-insensitive substring match over name, e-mail, and role.
    async fn search(&self, term: &str) -> Result<Vec<User>, Error>;

    /// Exact, case-insensitive e-mail match.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, Error>;
}
