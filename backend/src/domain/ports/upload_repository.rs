//! Driven port for durable upload records and their ledger effect.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::points::UPLOAD_REWARD_DESCRIPTION;
use crate::domain::{PointsHistoryEntry, StoredImage, Upload};

/// Failures surfaced by upload store implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRepositoryError {
    /// The backing store is unreachable.
    #[error("upload store unavailable: {message}")]
    Connection {
        /// Driver-level detail, logged server-side only.
        message: String,
    },
    /// A query or the reward transaction failed.
    #[error("upload store error: {message}")]
    Query {
        /// Driver-level detail, logged server-side only.
        message: String,
    },
    /// No upload exists with the given id.
    #[error("upload not found")]
    NotFound,
}

impl UploadRepositoryError {
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

/// Result of persisting a rewarded upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Identifier of the new upload record.
    pub upload_id: Uuid,
    /// The uploader's balance after the reward was applied.
    pub total_points: i64,
}

/// An upload row joined with the submitter's username for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadListItem {
    /// The submission.
    pub upload: Upload,
    /// Username of the submitter.
    pub username: String,
}

/// Driven port for durable upload records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadRepository: Send + Sync {
    /// Insert the upload record (unapproved) and credit `reward` points plus
    /// one ledger entry to the uploader, all in one transaction.
    ///
    /// Either everything persists or nothing does; a failure must leave the
    /// balance and history untouched.
    async fn record_rewarded_upload<'a>(
        &self,
        user_id: Uuid,
        image: &StoredImage,
        description: Option<&'a str>,
        reward: i32,
    ) -> Result<UploadReceipt, UploadRepositoryError>;

    /// All uploads, newest first, with submitter usernames.
    async fn list_all(&self) -> Result<Vec<UploadListItem>, UploadRepositoryError>;

    /// Mark an upload as approved.
    async fn approve(&self, upload_id: Uuid) -> Result<(), UploadRepositoryError>;

    /// Delete an upload record, returning it so callers can clean up the blob.
    async fn delete(&self, upload_id: Uuid) -> Result<Upload, UploadRepositoryError>;
}

#[derive(Default)]
struct FixtureState {
    uploads: Vec<Upload>,
    balances: HashMap<Uuid, i64>,
    history: Vec<PointsHistoryEntry>,
    fail_next_record: bool,
}

/// In-memory upload store for tests.
#[derive(Default)]
pub struct FixtureUploadRepository {
    state: Mutex<FixtureState>,
}

impl FixtureUploadRepository {
    /// Create an empty fixture store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `record_rewarded_upload` call fail after rollback.
    pub fn fail_next_record(&self) {
        let mut state = self.state.lock().expect("fixture state lock");
        state.fail_next_record = true;
    }

    /// Current fixture balance for a user.
    #[must_use]
    pub fn balance_of(&self, user_id: Uuid) -> i64 {
        let state = self.state.lock().expect("fixture state lock");
        state.balances.get(&user_id).copied().unwrap_or(0)
    }

    /// Ledger entries recorded for a user.
    #[must_use]
    pub fn history_of(&self, user_id: Uuid) -> Vec<PointsHistoryEntry> {
        let state = self.state.lock().expect("fixture state lock");
        state
            .history
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Whether any upload record references the given blob URL.
    #[must_use]
    pub fn references_url(&self, url: &str) -> bool {
        let state = self.state.lock().expect("fixture state lock");
        state.uploads.iter().any(|upload| upload.image_url == url)
    }
}

#[async_trait]
impl UploadRepository for FixtureUploadRepository {
    async fn record_rewarded_upload<'a>(
        &self,
        user_id: Uuid,
        image: &StoredImage,
        description: Option<&'a str>,
        reward: i32,
    ) -> Result<UploadReceipt, UploadRepositoryError> {
        let mut state = self.state.lock().expect("fixture state lock");
        if state.fail_next_record {
            state.fail_next_record = false;
            return Err(UploadRepositoryError::query("injected transaction failure"));
        }
        let upload = Upload {
            id: Uuid::new_v4(),
            user_id,
            image_url: image.url.clone(),
            description: description.map(str::to_owned),
            approved: false,
            created_at: Utc::now(),
        };
        let upload_id = upload.id;
        state.uploads.push(upload);
        let balance = state.balances.entry(user_id).or_insert(0);
        *balance += i64::from(reward);
        let total_points = *balance;
        state.history.push(PointsHistoryEntry {
            id: Uuid::new_v4(),
            user_id,
            delta: reward,
            description: UPLOAD_REWARD_DESCRIPTION.to_owned(),
            created_at: Utc::now(),
        });
        Ok(UploadReceipt {
            upload_id,
            total_points,
        })
    }

    async fn list_all(&self) -> Result<Vec<UploadListItem>, UploadRepositoryError> {
        let state = self.state.lock().expect("fixture state lock");
        let mut items: Vec<UploadListItem> = state
            .uploads
            .iter()
            .map(|upload| UploadListItem {
                upload: upload.clone(),
                username: "fixture".to_owned(),
            })
            .collect();
        items.sort_by(|a, b| b.upload.created_at.cmp(&a.upload.created_at));
        Ok(items)
    }

    async fn approve(&self, upload_id: Uuid) -> Result<(), UploadRepositoryError> {
        let mut state = self.state.lock().expect("fixture state lock");
        let upload = state
            .uploads
            .iter_mut()
            .find(|upload| upload.id == upload_id)
            .ok_or(UploadRepositoryError::NotFound)?;
        upload.approved = true;
        Ok(())
    }

    async fn delete(&self, upload_id: Uuid) -> Result<Upload, UploadRepositoryError> {
        let mut state = self.state.lock().expect("fixture state lock");
        let position = state
            .uploads
            .iter()
            .position(|upload| upload.id == upload_id)
            .ok_or(UploadRepositoryError::NotFound)?;
        Ok(state.uploads.remove(position))
    }
}
