//! Driving port for voucher redemption.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DomainError, VoucherType};

/// The effect applied by a committed redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionOutcome {
    /// Whether points were credited or a discount granted.
    pub voucher_type: VoucherType,
    /// Points credited, or the discount percentage (informational only).
    pub value: i32,
}

/// Driving port: atomically validate, consume, and apply a voucher.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoucherRedemption: Send + Sync {
    /// Redeem `code` on behalf of the authenticated user.
    ///
    /// Exactly one concurrent attempt per code succeeds; every other attempt
    /// fails with `InvalidRequest` ("Invalid or used voucher") and leaves the
    /// ledger untouched.
    async fn redeem(&self, user_id: Uuid, code: &str) -> Result<RedemptionOutcome, DomainError>;
}
