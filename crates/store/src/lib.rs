//! Storage boundary for Caliper checksheets.
//!
//! [`CheckStore`] is the async trait every backend implements;
//! [`MemoryStore`] is the bundled in-memory backend. The
//! [`conformance`] suite verifies any backend against the trait
//! contract, and [`maintenance`] keeps monthly record partitions ahead
//! of traffic.

pub mod conformance;
pub mod maintenance;
pub mod memory;

mod error;
mod traits;

pub use error::StoreError;
pub use memory::{MemoryStore, MemoryStoreConfig};
pub use traits::{partition_key, partition_key_for, CheckStore};
