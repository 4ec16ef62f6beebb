//! Driving port for fetching an authenticated user's profile.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DomainError, User};

/// Driving port for profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Fetch the profile, including the live points balance.
    ///
    /// Fails with `NotFound` when no such user exists.
    async fn fetch(&self, user_id: Uuid) -> Result<User, DomainError>;
}
