//! Driving port for upload moderation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::UploadListItem;
use crate::domain::DomainError;

/// Driving port: list, approve, and delete image submissions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadAdmin: Send + Sync {
    /// All submissions, newest first, with submitter usernames.
    async fn list(&self) -> Result<Vec<UploadListItem>, DomainError>;

    /// Approve a submission. Fails with `NotFound` for unknown ids.
    async fn approve(&self, upload_id: Uuid) -> Result<(), DomainError>;

    /// Delete a submission and best-effort remove its blob.
    async fn delete(&self, upload_id: Uuid) -> Result<(), DomainError>;
}
