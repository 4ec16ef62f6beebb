//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain's driven ports, backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! The adapters here are thin: they translate between Diesel row structs and
//! domain types and map driver errors onto the port error enums. Business
//! rules live in the domain services. Row structs (`models.rs`) and the table
//! definitions (`schema.rs`) are internal to this module.
//!
//! The one cross-cutting piece is [`ledger::credit`]: every balance change
//! goes through it so the cached `users.points` column and the
//! `points_history` table can never drift apart.

pub(crate) mod error_mapping;
mod diesel_login_service;
mod diesel_stats_query;
mod diesel_upload_repository;
mod diesel_voucher_repository;
mod ledger;
mod models;
mod pool;
mod schema;

use diesel_migrations::{embed_migrations, EmbeddedMigrations};

pub use diesel_login_service::DieselLoginService;
pub use diesel_stats_query::DieselStatsQuery;
pub use diesel_upload_repository::DieselUploadRepository;
pub use diesel_voucher_repository::DieselVoucherRepository;
pub use ledger::DieselPointsQuery;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Embedded schema migrations, applied at startup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
