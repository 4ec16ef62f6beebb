//! Image submissions and pre-storage validation.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::DomainError;

/// Largest accepted image payload: 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// `image/jpeg` (also covers `.jpg`).
    Jpeg,
    /// `image/png`.
    Png,
}

impl ImageKind {
    /// Resolve an accepted kind from a MIME content type.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Canonical file extension for stored blobs.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Raw image submission as received by the HTTP adapter.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// MIME content type declared for the uploaded field.
    pub content_type: Option<String>,
    /// Buffered image bytes.
    pub bytes: Vec<u8>,
}

/// An image payload that passed type and size validation.
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    /// Detected format.
    pub kind: ImageKind,
    /// Image bytes, at most [`MAX_IMAGE_BYTES`] long.
    pub bytes: Vec<u8>,
}

impl ValidatedImage {
    /// Validate a raw payload before any storage I/O happens.
    pub fn try_from_payload(payload: ImagePayload) -> Result<Self, DomainError> {
        if payload.bytes.is_empty() {
            return Err(DomainError::invalid_request("No image file provided"));
        }
        let content_type = payload
            .content_type
            .as_deref()
            .ok_or_else(|| DomainError::invalid_request("No image file provided"))?;
        let kind = ImageKind::from_content_type(content_type).ok_or_else(|| {
            DomainError::invalid_request("Only .png, .jpg and .jpeg images are allowed")
                .with_details(json!({ "contentType": content_type }))
        })?;
        if payload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::invalid_request(
                "File too large: the upload limit is 5 MiB",
            )
            .with_details(json!({ "sizeBytes": payload.bytes.len() })));
        }
        Ok(Self {
            kind,
            bytes: payload.bytes,
        })
    }
}

/// A durable blob written by the image store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Unpredictable file name, extension preserved.
    pub file_name: String,
    /// Public URL path referencing the blob.
    pub url: String,
}

/// A recorded image submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Stable identifier.
    pub id: Uuid,
    /// Submitting user.
    pub user_id: Uuid,
    /// Blob location as served to clients.
    pub image_url: String,
    /// Optional submitter-provided description.
    pub description: Option<String>,
    /// Whether an administrator has approved the submission.
    pub approved: bool,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}
