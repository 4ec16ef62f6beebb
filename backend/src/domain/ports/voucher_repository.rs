//! Driven port for the voucher store.
//!
//! The store owns the only mutable voucher state, the `used` flag, and must
//! consume a voucher and apply its ledger effect as one atomic unit.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::points::REDEMPTION_DESCRIPTION;
use crate::domain::{PointsHistoryEntry, Voucher, VoucherBatchRequest, VoucherType};

/// Failures surfaced by voucher store implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoucherRepositoryError {
    /// The backing store is unreachable.
    #[error("voucher store unavailable: {message}")]
    Connection {
        /// Driver-level detail, logged server-side only.
        message: String,
    },
    /// A query failed.
    #[error("voucher store error: {message}")]
    Query {
        /// Driver-level detail, logged server-side only.
        message: String,
    },
    /// The code does not exist or the voucher was already consumed.
    #[error("invalid or used voucher")]
    InvalidOrUsed,
    /// A generated code collided with an existing one.
    #[error("duplicate voucher code: {code}")]
    DuplicateCode {
        /// The colliding code.
        code: String,
    },
}

impl VoucherRepositoryError {
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

    /// Build a duplicate-code error.
    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode { code: code.into() }
    }
}

/// The effect granted by a successful redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeemedVoucher {
    /// Whether points were credited or a discount granted.
    pub voucher_type: VoucherType,
    /// Points credited, or the discount percentage.
    pub value: i32,
}

/// Driven port for durable voucher records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoucherRepository: Send + Sync {
    /// Atomically consume the voucher with `code` on behalf of `user_id`.
    ///
    /// Implementations must serialise concurrent attempts on the same code
    /// (pessimistic lock held to transaction end) and, for `points` vouchers,
    /// credit the redeemer's balance plus one ledger entry in the same
    /// transaction. Returns [`VoucherRepositoryError::InvalidOrUsed`] when the
    /// code is unknown or already consumed.
    async fn redeem_one(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<RedeemedVoucher, VoucherRepositoryError>;

    /// Insert a batch of freshly generated codes.
    ///
    /// Fails with [`VoucherRepositoryError::DuplicateCode`] when any code
    /// already exists; the whole batch is rolled back so the caller can
    /// regenerate and retry.
    async fn insert_batch(
        &self,
        request: &VoucherBatchRequest,
        codes: &[String],
    ) -> Result<(), VoucherRepositoryError>;

    /// All vouchers, newest first, with the redeeming username when consumed.
    async fn list_all(&self) -> Result<Vec<Voucher>, VoucherRepositoryError>;
}

#[derive(Default)]
struct FixtureState {
    vouchers: Vec<Voucher>,
    balances: HashMap<Uuid, i64>,
    history: Vec<PointsHistoryEntry>,
}

/// In-memory voucher store for tests.
///
/// Enforces the at-most-once contract behind a mutex so concurrency tests can
/// run the real redemption flow without a database.
#[derive(Default)]
pub struct FixtureVoucherRepository {
    state: Mutex<FixtureState>,
}

impl FixtureVoucherRepository {
    /// Create an empty fixture store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a redeemable voucher.
    pub fn seed_voucher(&self, code: &str, voucher_type: VoucherType, value: i32) {
        let mut state = self.state.lock().expect("fixture state lock");
        state.vouchers.push(Voucher {
            id: Uuid::new_v4(),
            code: code.to_owned(),
            voucher_type,
            value,
            brand: "Fixture".to_owned(),
            used: false,
            used_by: None,
            expiry: None,
            created_at: Utc::now(),
        });
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
}

#[async_trait]
impl VoucherRepository for FixtureVoucherRepository {
    async fn redeem_one(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<RedeemedVoucher, VoucherRepositoryError> {
        let mut state = self.state.lock().expect("fixture state lock");
        let voucher = state
            .vouchers
            .iter_mut()
            .find(|voucher| voucher.code == code && !voucher.used)
            .ok_or(VoucherRepositoryError::InvalidOrUsed)?;
        voucher.used = true;
        voucher.used_by = Some(user_id.to_string());
        let redeemed = RedeemedVoucher {
            voucher_type: voucher.voucher_type,
            value: voucher.value,
        };

        if redeemed.voucher_type == VoucherType::Points {
            *state.balances.entry(user_id).or_insert(0) += i64::from(redeemed.value);
            state.history.push(PointsHistoryEntry {
                id: Uuid::new_v4(),
                user_id,
                delta: redeemed.value,
                description: REDEMPTION_DESCRIPTION.to_owned(),
                created_at: Utc::now(),
            });
        }
        Ok(redeemed)
    }

    async fn insert_batch(
        &self,
        request: &VoucherBatchRequest,
        codes: &[String],
    ) -> Result<(), VoucherRepositoryError> {
        let mut state = self.state.lock().expect("fixture state lock");
        if let Some(duplicate) = codes
            .iter()
            .find(|code| state.vouchers.iter().any(|voucher| &voucher.code == *code))
        {
            return Err(VoucherRepositoryError::duplicate_code(duplicate.clone()));
        }
        for code in codes {
            state.vouchers.push(Voucher {
                id: Uuid::new_v4(),
                code: code.clone(),
                voucher_type: request.voucher_type,
                value: request.value,
                brand: request.brand.clone(),
                used: false,
                used_by: None,
                expiry: request.expiry,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Voucher>, VoucherRepositoryError> {
        let state = self.state.lock().expect("fixture state lock");
        let mut vouchers = state.vouchers.clone();
        vouchers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vouchers)
    }
}
