//! Local-filesystem blob store.
//!
//! Blobs land in a flat directory that the HTTP layer serves under
//! `/uploads`. File names combine a millisecond timestamp with a random
//! suffix so they are collision-resistant and not guessable from upload
//! order alone.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng as _;
use tracing::debug;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{StoredImage, ValidatedImage};

/// Length of the random file-name suffix.
const NAME_SUFFIX_LEN: usize = 9;

/// Blob store writing to a local directory.
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ImageStoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|err| ImageStoreError::io(format!("create upload directory: {err}")))?;
        Ok(Self { root })
    }

    /// Directory the blobs are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn fresh_name(extension: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NAME_SUFFIX_LEN)
            .map(char::from)
            .collect();
        format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, extension)
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, image: &ValidatedImage) -> Result<StoredImage, ImageStoreError> {
        let file_name = Self::fresh_name(image.kind.extension());
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|err| ImageStoreError::io(format!("write {}: {err}", path.display())))?;

        debug!(file_name = %file_name, bytes = image.bytes.len(), "stored image blob");
        Ok(StoredImage {
            url: format!("/uploads/{file_name}"),
            file_name,
        })
    }

    async fn remove(&self, file_name: &str) -> Result<(), ImageStoreError> {
        let path = self.root.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone is as good as removed.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ImageStoreError::io(format!(
                "remove {}: {err}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Filesystem round trips against a temporary directory.
    use super::*;
    use crate::domain::ImageKind;
    use rstest::rstest;

    fn png_image() -> ValidatedImage {
        ValidatedImage {
            kind: ImageKind::Png,
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[rstest]
    #[tokio::test]
    async fn stored_blobs_land_under_the_root_with_the_right_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsImageStore::open(dir.path()).await.expect("open store");

        let stored = store.store(&png_image()).await.expect("store blob");

        assert!(stored.file_name.ends_with(".png"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.file_name));
        let on_disk = tokio::fs::read(dir.path().join(&stored.file_name))
            .await
            .expect("read blob back");
        assert_eq!(on_disk, png_image().bytes);
    }

    #[rstest]
    #[tokio::test]
    async fn removing_a_blob_deletes_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsImageStore::open(dir.path()).await.expect("open store");
        let stored = store.store(&png_image()).await.expect("store blob");

        store.remove(&stored.file_name).await.expect("remove blob");

        assert!(!dir.path().join(&stored.file_name).exists());
    }

    #[rstest]
    #[tokio::test]
    async fn removing_an_absent_blob_succeeds() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsImageStore::open(dir.path()).await.expect("open store");

        store.remove("never-written.png").await.expect("no-op remove");
    }

    #[rstest]
    #[tokio::test]
    async fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("a").join("b");

        let store = FsImageStore::open(&nested).await.expect("open store");

        assert!(store.root().is_dir());
    }
}
