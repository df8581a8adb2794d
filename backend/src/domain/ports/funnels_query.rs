//! Driving port for funnel reads.

use async_trait::async_trait;

use crate::domain::{Error, Funnel, FunnelStage};

/// Domain use-case port for listing funnels and their stages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FunnelsQuery: Send + Sync {
    /// Active funnels visible to the caller.
    ///
    /// Admins see every active funnel. Other callers see only funnels granted
    /// to `user_id`; without a user id they see nothing.
    async fn list_funnels(&self, user_id: Option<i64>, is_admin: bool)
    -> Result<Vec<Funnel>, Error>;

    /// Active stages of `funnel_id`, ordered by rank ascending.
    async fn list_stages(&self, funnel_id: &str) -> Result<Vec<FunnelStage>, Error>;

    /// Keys of the funnels granted to `user_id`.
    async fn list_user_funnels(&self, user_id: i64) -> Result<Vec<String>, Error>;
}
