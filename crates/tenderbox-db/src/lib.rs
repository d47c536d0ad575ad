//! Tenderbox Database Layer
//!
//! Persistence for tender records: the `TenderStore` abstraction, its Postgres implementation,
//! and (with the `test-utils` feature) an in-memory implementation.

pub mod db;

pub use db::{TenderRepository, TenderStore};

#[cfg(feature = "test-utils")]
pub use db::InMemoryTenderStore;
