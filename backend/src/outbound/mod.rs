//! Outbound adapters implementing the driven ports over real infrastructure.

pub mod persistence;
pub mod storage;
