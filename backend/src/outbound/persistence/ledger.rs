//! Points ledger persistence: the shared credit primitive and the read
//! adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PointsQuery, PointsQueryError};
use crate::domain::PointsHistoryEntry;

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewPointsHistoryRow, PointsHistoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{points_history, users};

/// Credit `delta` points to a user and append the matching ledger entry,
/// returning the new balance.
///
/// Takes a borrowed connection rather than a pool on purpose: callers must
/// already hold a transaction, so a balance update can never land without its
/// history entry.
pub(crate) async fn credit(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    delta: i32,
    description: &str,
) -> Result<i64, diesel::result::Error> {
    let balance: i64 = diesel::update(users::table.find(user_id))
        .set(users::points.eq(users::points + i64::from(delta)))
        .returning(users::points)
        .get_result(conn)
        .await?;

    diesel::insert_into(points_history::table)
        .values(&NewPointsHistoryRow {
            id: Uuid::new_v4(),
            user_id,
            points: delta,
            description,
        })
        .execute(conn)
        .await?;

    Ok(balance)
}

/// Diesel-backed implementation of the ledger read port.
#[derive(Clone)]
pub struct DieselPointsQuery {
    pool: DbPool,
}

impl DieselPointsQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PointsQueryError {
    map_basic_pool_error(error, PointsQueryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PointsQueryError {
    map_basic_diesel_error(error, PointsQueryError::query, PointsQueryError::connection)
}

#[async_trait]
impl PointsQuery for DieselPointsQuery {
    async fn balance(&self, user_id: Uuid) -> Result<i64, PointsQueryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(user_id)
            .select(users::points)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<PointsHistoryEntry>, PointsQueryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PointsHistoryRow> = points_history::table
            .filter(points_history::user_id.eq(user_id))
            .order(points_history::created_at.desc())
            .select(PointsHistoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| PointsHistoryEntry {
                id: row.id,
                user_id: row.user_id,
                delta: row.points,
                description: row.description,
                created_at: row.created_at,
            })
            .collect())
    }
}
