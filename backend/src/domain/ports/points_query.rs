//! Driven port for ledger reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::PointsHistoryEntry;

/// Failures surfaced by ledger query implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointsQueryError {
    /// The backing store is unreachable.
    #[error("points ledger unavailable: {message}")]
    Connection {
        /// Driver-level detail, logged server-side only.
        message: String,
    },
    /// A query failed.
    #[error("points ledger error: {message}")]
    Query {
        /// Driver-level detail, logged server-side only.
        message: String,
    },
}

impl PointsQueryError {
    /// Build a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Driven port for reading the points ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsQuery: Send + Sync {
    /// Current point total for a user.
    async fn balance(&self, user_id: Uuid) -> Result<i64, PointsQueryError>;

    /// Ledger entries for a user, newest first.
    async fn history(&self, user_id: Uuid) -> Result<Vec<PointsHistoryEntry>, PointsQueryError>;
}
