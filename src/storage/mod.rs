pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use traits::{MicroState, StateStore};
