//! Driving port for user writes.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserPatch};

/// Domain use-case port for registering and administering users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Self-registration; the account starts pending.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, Error>;

    /// Administrator-created account.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Merge `patch` over the stored user and return the re-read row.
    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, Error>;

    /// Mark the user active.
    async fn approve(&self, id: i64) -> Result<Option<User>, Error>;

    /// Mark the user blocked.
    async fn block(&self, id: i64) -> Result<Option<User>, Error>;

    /// Block the user; `false` when the write failed.
    async fn delete(&self, id: i64) -> bool;
}
