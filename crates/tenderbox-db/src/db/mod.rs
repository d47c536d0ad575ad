//! Database repositories for data access layer
//
// Tender records
pub mod tender;
//
// In-memory store for tests
#[cfg(feature = "test-utils")]
pub mod memory;

pub use tender::{TenderRepository, TenderStore};

#[cfg(feature = "test-utils")]
pub use memory::InMemoryTenderStore;
