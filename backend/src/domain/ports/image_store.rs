//! Driven port for durable image blobs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{StoredImage, ValidatedImage};

/// Failures surfaced by blob store implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageStoreError {
    /// The blob could not be written or removed.
    #[error("image store I/O failure: {message}")]
    Io {
        /// Driver-level detail, logged server-side only.
        message: String,
    },
}

impl ImageStoreError {
    /// Build an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Driven port for blob storage.
///
/// Blobs are written before the database transaction opens; `remove` is the
/// compensating action when that transaction later fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image under a collision-resistant, unpredictable name.
    async fn store(&self, image: &ValidatedImage) -> Result<StoredImage, ImageStoreError>;

    /// Remove a previously stored blob. Removing an absent blob succeeds.
    async fn remove(&self, file_name: &str) -> Result<(), ImageStoreError>;
}

/// In-memory blob store for tests.
#[derive(Default)]
pub struct FixtureImageStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    counter: Mutex<u64>,
}

impl FixtureImageStore {
    /// Create an empty fixture store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.lock().expect("fixture blob lock").len()
    }

    /// Whether the store holds no blobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for FixtureImageStore {
    async fn store(&self, image: &ValidatedImage) -> Result<StoredImage, ImageStoreError> {
        let mut counter = self.counter.lock().expect("fixture counter lock");
        *counter += 1;
        let file_name = format!("fixture-{}.{}", *counter, image.kind.extension());
        drop(counter);

        self.blobs
            .lock()
            .expect("fixture blob lock")
            .insert(file_name.clone(), image.bytes.clone());
        Ok(StoredImage {
            url: format!("/uploads/{file_name}"),
            file_name,
        })
    }

    async fn remove(&self, file_name: &str) -> Result<(), ImageStoreError> {
        self.blobs
            .lock()
            .expect("fixture blob lock")
            .remove(file_name);
        Ok(())
    }
}
