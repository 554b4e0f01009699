pub mod health;
pub mod pool;
pub mod workload;

pub use health::{Flag, IndexDescriptor, IndexHealth, annotate, leading_key};
pub use pool::IdPool;
pub use workload::{ChurnAction, ReadOp, WeightedBuckets};
