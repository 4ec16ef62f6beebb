//! Driving port for administrative voucher management.

use async_trait::async_trait;

use crate::domain::{DomainError, Voucher, VoucherBatchRequest};

/// Driving port: generate voucher batches and inspect the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoucherAdmin: Send + Sync {
    /// Generate `request.quantity` unique codes and persist the batch.
    ///
    /// Returns the codes in generation order.
    async fn generate(&self, request: VoucherBatchRequest) -> Result<Vec<String>, DomainError>;

    /// All vouchers, newest first, with redeemer usernames where consumed.
    async fn list(&self) -> Result<Vec<Voucher>, DomainError>;
}
