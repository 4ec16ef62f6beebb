//! Voucher entities, batch-generation requests, and code generation.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::DomainError;

/// What redeeming a voucher grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    /// The value is credited to the redeemer's point balance.
    Points,
    /// The value is a discount percentage; informational only, no ledger
    /// mutation.
    Discount,
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Points => write!(f, "points"),
            Self::Discount => write!(f, "discount"),
        }
    }
}

impl std::str::FromStr for VoucherType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "points" => Ok(Self::Points),
            "discount" => Ok(Self::Discount),
            other => Err(format!("unknown voucher type: {other}")),
        }
    }
}

/// A single-use voucher.
///
/// ## Invariants
/// - `code` is unique and immutable.
/// - `used` transitions `false -> true` at most once, only via redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voucher {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique redemption code.
    pub code: String,
    /// Effect applied on redemption.
    pub voucher_type: VoucherType,
    /// Points credited or discount percentage, depending on the type.
    pub value: i32,
    /// Partner brand the voucher belongs to.
    pub brand: String,
    /// Whether the voucher has been consumed.
    pub used: bool,
    /// Username of the redeemer, when consumed.
    pub used_by: Option<String>,
    /// Optional expiry timestamp.
    pub expiry: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Upper bound on one generation batch.
pub const MAX_BATCH_QUANTITY: i64 = 500;

/// Validated request to generate a batch of vouchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherBatchRequest {
    /// Effect of every voucher in the batch.
    pub voucher_type: VoucherType,
    /// Points or discount percentage per voucher.
    pub value: i32,
    /// Number of codes to generate.
    pub quantity: u16,
    /// Partner brand.
    pub brand: String,
    /// Optional expiry applied to the whole batch.
    pub expiry: Option<DateTime<Utc>>,
}

impl VoucherBatchRequest {
    /// Validate raw batch-generation input.
    ///
    /// A missing brand is a validation failure, not a server fault; quantity
    /// must be a positive integer no greater than [`MAX_BATCH_QUANTITY`].
    pub fn try_new(
        voucher_type: &str,
        value: i32,
        quantity: i64,
        brand: &str,
        expiry: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        let voucher_type: VoucherType = voucher_type.parse().map_err(|_| {
            DomainError::invalid_request("type must be points or discount")
                .with_details(json!({ "field": "type", "value": voucher_type }))
        })?;
        if brand.trim().is_empty() {
            return Err(DomainError::invalid_request("Brand is required")
                .with_details(json!({ "field": "brand" })));
        }
        if value < 0 {
            return Err(DomainError::invalid_request("value must not be negative")
                .with_details(json!({ "field": "value" })));
        }
        if !(1..=MAX_BATCH_QUANTITY).contains(&quantity) {
            return Err(DomainError::invalid_request(format!(
                "quantity must be between 1 and {MAX_BATCH_QUANTITY}"
            ))
            .with_details(json!({ "field": "quantity", "value": quantity })));
        }
        let quantity =
            u16::try_from(quantity).map_err(|_| DomainError::internal("quantity out of range"))?;
        Ok(Self {
            voucher_type,
            value,
            quantity,
            brand: brand.trim().to_owned(),
            expiry,
        })
    }
}

/// Prefix shared by every generated code.
pub const CODE_PREFIX: &str = "FF-";

const CODE_SUFFIX_LEN: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a fresh voucher code: `FF-` plus six random uppercase
/// alphanumerics.
///
/// Uniqueness is not guaranteed here; the voucher store enforces it with a
/// unique constraint and callers regenerate on conflict.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| {
            CODE_CHARSET
                .choose(rng)
                .copied()
                .unwrap_or(b'A') as char
        })
        .collect();
    format!("{CODE_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for batch validation and code generation.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn batch_request_accepts_valid_input() {
        let request = VoucherBatchRequest::try_new("points", 50, 5, "KopiKita", None)
            .expect("valid batch request");
        assert_eq!(request.voucher_type, VoucherType::Points);
        assert_eq!(request.quantity, 5);
        assert_eq!(request.brand, "KopiKita");
    }

    #[rstest]
    fn missing_brand_is_a_validation_error() {
        let err = VoucherBatchRequest::try_new("points", 50, 5, "  ", None)
            .expect_err("missing brand must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Brand is required");
    }

    #[rstest]
    #[case("vouchery")]
    #[case("POINTS")]
    #[case("")]
    fn unknown_types_are_rejected(#[case] voucher_type: &str) {
        let err = VoucherBatchRequest::try_new(voucher_type, 50, 5, "KopiKita", None)
            .expect_err("unknown type must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(MAX_BATCH_QUANTITY + 1)]
    fn out_of_range_quantities_are_rejected(#[case] quantity: i64) {
        let err = VoucherBatchRequest::try_new("discount", 20, quantity, "KopiKita", None)
            .expect_err("bad quantity must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn generated_codes_have_the_expected_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let code = generate_code(&mut rng);
            let suffix = code.strip_prefix(CODE_PREFIX).expect("FF- prefix");
            assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
            assert!(suffix
                .bytes()
                .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit()));
        }
    }

    #[rstest]
    fn voucher_type_round_trips_through_str() {
        for (raw, parsed) in [("points", VoucherType::Points), ("discount", VoucherType::Discount)]
        {
            assert_eq!(raw.parse::<VoucherType>().expect("parse type"), parsed);
            assert_eq!(parsed.to_string(), raw);
        }
    }
}
