//! Driving port for the administrative statistics view.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Aggregate counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Registered accounts.
    pub total_users: i64,
    /// Unused vouchers that have not expired.
    pub active_vouchers: i64,
    /// Consumed vouchers.
    pub redeemed_vouchers: i64,
    /// Image submissions.
    pub total_uploads: i64,
}

/// Driving port for aggregate statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsQuery: Send + Sync {
    /// Compute the dashboard counters.
    async fn fetch(&self) -> Result<AdminStats, DomainError>;
}
