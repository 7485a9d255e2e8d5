//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (wall clock for save stamps)
//! - Storage (LocalStorage on web, in-memory on native)

pub mod storage;
pub mod time;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{KeyValueStorage, MemoryStorage, SharedStorage, StorageError};
pub use time::{Clock, ManualClock, SystemClock};
