//! Core domain: entities, validation, services, and the port boundary.
//!
//! Everything here is transport and storage agnostic. Inbound adapters call
//! the driving ports; outbound adapters implement the driven ports.

pub mod auth;
pub mod error;
pub mod points;
pub mod ports;
pub mod redemption_service;
pub mod upload;
pub mod upload_reward_service;
pub mod user;
pub mod voucher;

pub use auth::{Principal, Role, TokenSigner, TokenVerifier};
pub use error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use points::{
    PointsHistoryEntry, REDEMPTION_DESCRIPTION, UPLOAD_REWARD_DESCRIPTION, UPLOAD_REWARD_POINTS,
};
pub use redemption_service::VoucherService;
pub use upload::{
    ImageKind, ImagePayload, StoredImage, Upload, ValidatedImage, MAX_IMAGE_BYTES,
};
pub use upload_reward_service::UploadRewardService;
pub use user::{Registration, User};
pub use voucher::{
    generate_code, Voucher, VoucherBatchRequest, VoucherType, CODE_PREFIX, MAX_BATCH_QUANTITY,
};
