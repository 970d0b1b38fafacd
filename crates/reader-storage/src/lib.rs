pub mod batch;
pub mod evaluate;
pub mod memory;

pub use batch::rows_from_batches;
pub use evaluate::{evaluate, like_match, matches};
pub use memory::{MemoryQuery, MemoryRows};
