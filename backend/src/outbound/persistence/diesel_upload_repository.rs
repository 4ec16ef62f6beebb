//! PostgreSQL-backed upload store.
//!
//! `record_rewarded_upload` couples the upload row with its ledger credit in
//! one transaction so a reward can never land without its submission, or the
//! other way round.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::points::UPLOAD_REWARD_DESCRIPTION;
use crate::domain::ports::{
    UploadListItem, UploadReceipt, UploadRepository, UploadRepositoryError,
};
use crate::domain::{StoredImage, Upload};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::ledger::credit;
use super::models::{NewUploadRow, UploadRow};
use super::pool::{DbPool, PoolError};
use super::schema::{uploads, users};

/// Diesel-backed implementation of the upload store port.
#[derive(Clone)]
pub struct DieselUploadRepository {
    pool: DbPool,
}

impl DieselUploadRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UploadRepositoryError {
    map_basic_pool_error(error, UploadRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UploadRepositoryError {
    map_basic_diesel_error(
        error,
        UploadRepositoryError::query,
        UploadRepositoryError::connection,
    )
}

fn row_to_upload(row: UploadRow) -> Upload {
    Upload {
        id: row.id,
        user_id: row.user_id,
        image_url: row.image_url,
        description: row.description,
        approved: row.approved,
        created_at: row.created_at,
    }
}

#[async_trait]
impl UploadRepository for DieselUploadRepository {
    async fn record_rewarded_upload<'a>(
        &self,
        user_id: Uuid,
        image: &StoredImage,
        description: Option<&'a str>,
        reward: i32,
    ) -> Result<UploadReceipt, UploadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let upload_id = Uuid::new_v4();

        conn.transaction::<UploadReceipt, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(uploads::table)
                    .values(&NewUploadRow {
                        id: upload_id,
                        user_id,
                        image_url: &image.url,
                        description,
                        approved: false,
                    })
                    .execute(conn)
                    .await?;

                let total_points =
                    credit(conn, user_id, reward, UPLOAD_REWARD_DESCRIPTION).await?;

                Ok(UploadReceipt {
                    upload_id,
                    total_points,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_all(&self) -> Result<Vec<UploadListItem>, UploadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(UploadRow, String)> = uploads::table
            .inner_join(users::table)
            .order(uploads::created_at.desc())
            .select((UploadRow::as_select(), users::username))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(row, username)| UploadListItem {
                upload: row_to_upload(row),
                username,
            })
            .collect())
    }

    async fn approve(&self, upload_id: Uuid) -> Result<(), UploadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(uploads::table.find(upload_id))
            .set(uploads::approved.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(UploadRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, upload_id: Uuid) -> Result<Upload, UploadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UploadRow> = diesel::delete(uploads::table.find(upload_id))
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_upload).ok_or(UploadRepositoryError::NotFound)
    }
}
