//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{points_history, uploads, users, vouchers};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub fullname: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub points: i64,
}

/// Row struct for reading from the vouchers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vouchers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoucherRow {
    pub id: Uuid,
    pub code: String,
    pub voucher_type: String,
    pub value: i32,
    pub brand: String,
    pub used: bool,
    #[expect(dead_code, reason = "listings resolve the redeemer via a join")]
    pub used_by: Option<Uuid>,
    pub expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new voucher records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vouchers)]
pub(crate) struct NewVoucherRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub voucher_type: &'a str,
    pub value: i32,
    pub brand: &'a str,
    pub used: bool,
    pub expiry: Option<DateTime<Utc>>,
}

/// Row struct for reading from the points_history table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = points_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PointsHistoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub points: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = points_history)]
pub(crate) struct NewPointsHistoryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub points: i32,
    pub description: &'a str,
}

/// Row struct for reading from the uploads table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = uploads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UploadRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub description: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new upload records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = uploads)]
pub(crate) struct NewUploadRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: &'a str,
    pub description: Option<&'a str>,
    pub approved: bool,
}
