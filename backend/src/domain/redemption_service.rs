//! Voucher redemption and administration services.
//!
//! [`VoucherService`] implements the driving ports over the voucher store
//! port; the store supplies atomicity and locking, the service supplies
//! validation, code generation, and error mapping.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    RedemptionOutcome, VoucherAdmin, VoucherRedemption, VoucherRepository, VoucherRepositoryError,
};
use crate::domain::voucher::generate_code;
use crate::domain::{DomainError, Voucher, VoucherBatchRequest};

/// Bound on regenerate-and-retry rounds when generated codes collide.
const MAX_BATCH_ATTEMPTS: usize = 8;

/// Voucher use-cases over a voucher store.
#[derive(Clone)]
pub struct VoucherService<R> {
    repository: Arc<R>,
}

impl<R> VoucherService<R> {
    /// Create a new service over the given store.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

fn map_store_error(error: VoucherRepositoryError) -> DomainError {
    match error {
        VoucherRepositoryError::InvalidOrUsed => {
            DomainError::invalid_request("Invalid or used voucher")
        }
        VoucherRepositoryError::Connection { message } => {
            DomainError::service_unavailable(format!("voucher store unavailable: {message}"))
        }
        VoucherRepositoryError::Query { message } => {
            DomainError::internal(format!("voucher store error: {message}"))
        }
        VoucherRepositoryError::DuplicateCode { code } => {
            DomainError::internal(format!("voucher code collision persisted: {code}"))
        }
    }
}

/// Generate `quantity` codes that are distinct within the batch.
fn generate_distinct_codes(quantity: u16) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut seen = HashSet::new();
    let mut codes = Vec::with_capacity(usize::from(quantity));
    while codes.len() < usize::from(quantity) {
        let code = generate_code(&mut rng);
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    codes
}

/// Replace one colliding code with a fresh one not already in the batch.
fn replace_code(codes: &mut [String], collided: &str) {
    let mut rng = rand::thread_rng();
    let taken: HashSet<&String> = codes.iter().collect();
    let replacement = loop {
        let candidate = generate_code(&mut rng);
        if !taken.contains(&candidate) {
            break candidate;
        }
    };
    if let Some(slot) = codes.iter_mut().find(|code| code.as_str() == collided) {
        *slot = replacement;
    }
}

#[async_trait]
impl<R> VoucherRedemption for VoucherService<R>
where
    R: VoucherRepository,
{
    async fn redeem(&self, user_id: Uuid, code: &str) -> Result<RedemptionOutcome, DomainError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(DomainError::invalid_request("Invalid or used voucher"));
        }

        let redeemed = self
            .repository
            .redeem_one(user_id, code)
            .await
            .map_err(map_store_error)?;

        info!(
            %user_id,
            voucher_type = %redeemed.voucher_type,
            value = redeemed.value,
            "voucher redeemed"
        );
        Ok(RedemptionOutcome {
            voucher_type: redeemed.voucher_type,
            value: redeemed.value,
        })
    }
}

#[async_trait]
impl<R> VoucherAdmin for VoucherService<R>
where
    R: VoucherRepository,
{
    async fn generate(&self, request: VoucherBatchRequest) -> Result<Vec<String>, DomainError> {
        let mut codes = generate_distinct_codes(request.quantity);

        for _ in 0..MAX_BATCH_ATTEMPTS {
            match self.repository.insert_batch(&request, &codes).await {
                Ok(()) => {
                    info!(
                        quantity = request.quantity,
                        brand = %request.brand,
                        "voucher batch generated"
                    );
                    return Ok(codes);
                }
                Err(VoucherRepositoryError::DuplicateCode { code }) => {
                    replace_code(&mut codes, &code);
                }
                Err(other) => return Err(map_store_error(other)),
            }
        }
        Err(DomainError::internal(
            "voucher code generation kept colliding; giving up",
        ))
    }

    async fn list(&self) -> Result<Vec<Voucher>, DomainError> {
        self.repository.list_all().await.map_err(map_store_error)
    }
}
