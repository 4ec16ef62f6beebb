//! PostgreSQL-backed admin dashboard counters.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AdminStats, StatsQuery};
use crate::domain::DomainError;

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{uploads, users, vouchers};

/// Diesel-backed implementation of the statistics port.
#[derive(Clone)]
pub struct DieselStatsQuery {
    pool: DbPool,
}

impl DieselStatsQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DomainError {
    map_basic_pool_error(error, DomainError::service_unavailable)
}

fn map_diesel_error(error: diesel::result::Error) -> DomainError {
    map_basic_diesel_error(error, DomainError::internal, DomainError::service_unavailable)
}

#[async_trait]
impl StatsQuery for DieselStatsQuery {
    async fn fetch(&self) -> Result<AdminStats, DomainError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = Utc::now();

        let total_users: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // An unredeemed voucher counts as active until its expiry passes;
        // vouchers without an expiry never age out.
        let active_vouchers: i64 = vouchers::table
            .filter(
                vouchers::used
                    .eq(false)
                    .and(vouchers::expiry.is_null().or(vouchers::expiry.gt(now))),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let redeemed_vouchers: i64 = vouchers::table
            .filter(vouchers::used.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let total_uploads: i64 = uploads::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(AdminStats {
            total_users,
            active_vouchers,
            redeemed_vouchers,
            total_uploads,
        })
    }
}
