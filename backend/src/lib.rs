//! FoodFlow backend: voucher redemption and points accrual for a loyalty
//! programme.
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] holds the entities, the port traits, and the services that
//!   enforce the business rules (single-use vouchers, the points ledger,
//!   rewarded image uploads).
//! - [`inbound`] adapts HTTP to the domain: REST handlers, bearer-credential
//!   extractors, and error mapping.
//! - [`outbound`] adapts the domain to infrastructure: Diesel/PostgreSQL
//!   persistence and filesystem blob storage.
//! - [`server`] wires the layers together into a running Actix server.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
