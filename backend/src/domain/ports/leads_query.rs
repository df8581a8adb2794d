//! Driving port for lead reads.

use async_trait::async_trait;

use crate::domain::{Error, Lead};

/// Domain use-case port for listing leads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadsQuery: Send + Sync {
    /// Active leads visible to the caller: all for admins, owned ones otherwise.
    async fn list_leads(&self, user_id: Option<i64>, is_admin: bool) -> Result<Vec<Lead>, Error>;
}
