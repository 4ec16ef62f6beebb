//! Driving port for rewarded image submissions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ImagePayload;
use crate::domain::DomainError;

/// A submission entering the upload reward engine.
#[derive(Debug, Clone)]
pub struct UploadRewardRequest {
    /// The authenticated uploader.
    pub user_id: Uuid,
    /// Raw image payload; validated before any storage I/O.
    pub image: ImagePayload,
    /// Optional submitter-provided description.
    pub description: Option<String>,
}

/// Result of a committed upload reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRewardOutcome {
    /// Identifier of the persisted upload record.
    pub upload_id: Uuid,
    /// Points credited by this submission.
    pub points_earned: i32,
    /// The uploader's balance after the credit.
    pub total_points: i64,
    /// Public URL of the stored image.
    pub image_url: String,
}

/// Driving port: persist a submission and credit the fixed reward atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadReward: Send + Sync {
    /// Validate, store, and record the submission, crediting the reward.
    ///
    /// When the database transaction fails after the blob was written, the
    /// blob is removed again (best effort) before the error surfaces.
    async fn reward(&self, request: UploadRewardRequest)
        -> Result<UploadRewardOutcome, DomainError>;
}
