//! Rewarded image submissions and upload moderation.
//!
//! [`UploadRewardService`] sequences the two effectful steps of a submission,
//! blob write then database transaction, and compensates by deleting the blob
//! when the transaction fails. The blob store is treated as subordinate to the
//! database: an upload row without a blob is a broken image link, a blob
//! without a row is unreachable garbage, and only the second is acceptable
//! transiently.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::points::UPLOAD_REWARD_POINTS;
use crate::domain::ports::{
    ImageStore, ImageStoreError, UploadAdmin, UploadListItem, UploadRepository,
    UploadRepositoryError, UploadReward, UploadRewardOutcome, UploadRewardRequest,
};
use crate::domain::{DomainError, ValidatedImage};

/// Upload use-cases over a blob store and an upload store.
#[derive(Clone)]
pub struct UploadRewardService<S, R> {
    images: Arc<S>,
    repository: Arc<R>,
}

impl<S, R> UploadRewardService<S, R> {
    /// Create a new service over the given stores.
    pub fn new(images: Arc<S>, repository: Arc<R>) -> Self {
        Self { images, repository }
    }
}

fn map_store_error(error: UploadRepositoryError) -> DomainError {
    match error {
        UploadRepositoryError::NotFound => DomainError::not_found("Upload not found"),
        UploadRepositoryError::Connection { message } => {
            DomainError::service_unavailable(format!("upload store unavailable: {message}"))
        }
        UploadRepositoryError::Query { message } => {
            DomainError::internal(format!("upload store error: {message}"))
        }
    }
}

fn map_image_error(error: ImageStoreError) -> DomainError {
    let ImageStoreError::Io { message } = error;
    DomainError::internal(format!("image store failure: {message}"))
}

/// Extract the blob file name from a public upload URL.
fn file_name_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

impl<S, R> UploadRewardService<S, R>
where
    S: ImageStore,
{
    async fn remove_blob_best_effort(&self, file_name: &str, context: &str) {
        if let Err(error) = self.images.remove(file_name).await {
            warn!(%error, file_name, context, "orphaned image blob left behind");
        }
    }
}

#[async_trait]
impl<S, R> UploadReward for UploadRewardService<S, R>
where
    S: ImageStore,
    R: UploadRepository,
{
    async fn reward(
        &self,
        request: UploadRewardRequest,
    ) -> Result<UploadRewardOutcome, DomainError> {
        let UploadRewardRequest {
            user_id,
            image,
            description,
        } = request;
        // Validation happens before any I/O so rejected payloads leave no
        // trace in either store.
        let image = ValidatedImage::try_from_payload(image)?;

        let stored = self.images.store(&image).await.map_err(map_image_error)?;

        let receipt = match self
            .repository
            .record_rewarded_upload(user_id, &stored, description.as_deref(), UPLOAD_REWARD_POINTS)
            .await
        {
            Ok(receipt) => receipt,
            Err(error) => {
                self.remove_blob_best_effort(&stored.file_name, "reward transaction failed")
                    .await;
                return Err(map_store_error(error));
            }
        };

        info!(
            %user_id,
            upload_id = %receipt.upload_id,
            points_earned = UPLOAD_REWARD_POINTS,
            total_points = receipt.total_points,
            "upload rewarded"
        );
        Ok(UploadRewardOutcome {
            upload_id: receipt.upload_id,
            points_earned: UPLOAD_REWARD_POINTS,
            total_points: receipt.total_points,
            image_url: stored.url,
        })
    }
}

#[async_trait]
impl<S, R> UploadAdmin for UploadRewardService<S, R>
where
    S: ImageStore,
    R: UploadRepository,
{
    async fn list(&self) -> Result<Vec<UploadListItem>, DomainError> {
        self.repository.list_all().await.map_err(map_store_error)
    }

    async fn approve(&self, upload_id: Uuid) -> Result<(), DomainError> {
        self.repository
            .approve(upload_id)
            .await
            .map_err(map_store_error)?;
        info!(%upload_id, "upload approved");
        Ok(())
    }

    async fn delete(&self, upload_id: Uuid) -> Result<(), DomainError> {
        let upload = self
            .repository
            .delete(upload_id)
            .await
            .map_err(map_store_error)?;
        self.remove_blob_best_effort(file_name_from_url(&upload.image_url), "upload deleted")
            .await;
        info!(%upload_id, "upload deleted");
        Ok(())
    }
}
