pub mod catalog;
pub mod churn;
pub mod connection;
pub mod error;
pub mod fixtures;
pub mod pools;
pub mod seed;
pub mod simulate;
pub mod test_utils; // Test utilities - available for integration tests

pub use catalog::{fetch_index_stats, reset_statistics};
pub use churn::{ChurnGenerator, ChurnStats, toggle_cancellation};
pub use connection::ConnectionPool;
pub use error::{Error, Result};
pub use pools::{ChurnPools, ReadPools};
pub use seed::{SeedSummary, seed_demo_data};
pub use simulate::{DEFAULT_SEED, ReadSimulator};
