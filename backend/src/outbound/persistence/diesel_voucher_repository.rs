//! PostgreSQL-backed voucher store.
//!
//! Redemption runs as one transaction with a pessimistic row lock
//! (`SELECT ... FOR UPDATE`) so exactly one of any number of concurrent
//! attempts on the same code can flip the `used` flag; the ledger credit for
//! `points` vouchers happens inside the same transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::points::REDEMPTION_DESCRIPTION;
use crate::domain::ports::{RedeemedVoucher, VoucherRepository, VoucherRepositoryError};
use crate::domain::{Voucher, VoucherBatchRequest, VoucherType};

use super::error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error, unique_violation_value,
};
use super::ledger::credit;
use super::models::{NewVoucherRow, VoucherRow};
use super::pool::{DbPool, PoolError};
use super::schema::{users, vouchers};

/// Diesel-backed implementation of the voucher store port.
#[derive(Clone)]
pub struct DieselVoucherRepository {
    pool: DbPool,
}

impl DieselVoucherRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VoucherRepositoryError {
    map_basic_pool_error(error, VoucherRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> VoucherRepositoryError {
    map_basic_diesel_error(
        error,
        VoucherRepositoryError::query,
        VoucherRepositoryError::connection,
    )
}

/// Failure paths inside the redemption transaction.
enum RedeemTxError {
    InvalidOrUsed,
    CorruptType(String),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for RedeemTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_redeem_error(error: RedeemTxError) -> VoucherRepositoryError {
    match error {
        RedeemTxError::InvalidOrUsed => VoucherRepositoryError::InvalidOrUsed,
        RedeemTxError::CorruptType(message) => VoucherRepositoryError::query(message),
        RedeemTxError::Diesel(error) => map_diesel_error(error),
    }
}

fn parse_voucher_type(raw: &str) -> Result<VoucherType, RedeemTxError> {
    raw.parse()
        .map_err(|message: String| RedeemTxError::CorruptType(message))
}

fn row_to_voucher(row: VoucherRow, used_by: Option<String>) -> Result<Voucher, VoucherRepositoryError> {
    let voucher_type = row
        .voucher_type
        .parse()
        .map_err(VoucherRepositoryError::query)?;
    Ok(Voucher {
        id: row.id,
        code: row.code,
        voucher_type,
        value: row.value,
        brand: row.brand,
        used: row.used,
        used_by,
        expiry: row.expiry,
        created_at: row.created_at,
    })
}

#[async_trait]
impl VoucherRepository for DieselVoucherRepository {
    async fn redeem_one(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<RedeemedVoucher, VoucherRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<RedeemedVoucher, RedeemTxError, _>(|conn| {
            async move {
                // The row lock is held to commit; a concurrent attempt on the
                // same code blocks here and then sees `used = true`.
                let row: Option<VoucherRow> = vouchers::table
                    .filter(vouchers::code.eq(code).and(vouchers::used.eq(false)))
                    .for_update()
                    .select(VoucherRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                let Some(row) = row else {
                    return Err(RedeemTxError::InvalidOrUsed);
                };
                let voucher_type = parse_voucher_type(&row.voucher_type)?;

                diesel::update(vouchers::table.find(row.id))
                    .set((vouchers::used.eq(true), vouchers::used_by.eq(user_id)))
                    .execute(conn)
                    .await?;

                if voucher_type == VoucherType::Points {
                    credit(conn, user_id, row.value, REDEMPTION_DESCRIPTION).await?;
                }

                Ok(RedeemedVoucher {
                    voucher_type,
                    value: row.value,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_redeem_error)
    }

    async fn insert_batch(
        &self,
        request: &VoucherBatchRequest,
        codes: &[String],
    ) -> Result<(), VoucherRepositoryError> {
        // Must outlive `conn`: the transaction closure borrows it.
        let voucher_type = request.voucher_type.to_string();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<(), diesel::result::Error, _>(|conn| {
                {
                    let voucher_type = voucher_type.as_str();
                    async move {
                        let rows: Vec<NewVoucherRow<'_>> = codes
                            .iter()
                            .map(|code| NewVoucherRow {
                                id: Uuid::new_v4(),
                                code,
                                voucher_type,
                                value: request.value,
                                brand: &request.brand,
                                used: false,
                                expiry: request.expiry,
                            })
                            .collect();
                        diesel::insert_into(vouchers::table)
                            .values(&rows)
                            .execute(conn)
                            .await?;
                        Ok(())
                    }
                }
                .scope_boxed()
            })
            .await;

        result.map_err(|error| {
            if is_unique_violation(&error) {
                let code = unique_violation_value(&error)
                    .or_else(|| codes.first().cloned())
                    .unwrap_or_default();
                VoucherRepositoryError::duplicate_code(code)
            } else {
                map_diesel_error(error)
            }
        })
    }

    async fn list_all(&self) -> Result<Vec<Voucher>, VoucherRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(VoucherRow, Option<String>)> = vouchers::table
            .left_join(users::table)
            .order(vouchers::created_at.desc())
            .select((VoucherRow::as_select(), users::username.nullable()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(row, used_by)| row_to_voucher(row, used_by))
            .collect()
    }
}
