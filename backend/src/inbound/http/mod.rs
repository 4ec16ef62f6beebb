//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod state;
pub mod trace;
pub mod uploads;
pub mod users;
pub mod vouchers;

pub use error::ApiResult;
