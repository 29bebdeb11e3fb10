//! A read-only users/posts dataset held in memory.

mod dataset;
mod store;

pub use self::dataset::IntegrityViolation;
pub use self::store::MemoryStore;
