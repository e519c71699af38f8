//! Storage module
//!
//! Key-value persistence for settings and uploaded backgrounds, plus the
//! quota helpers used before admitting new images.

pub mod json_store;
pub mod kv_store;
pub mod memory_store;
pub mod quota;

pub use json_store::JsonFileStore;
pub use kv_store::{KeyValueStore, StoredItems};
pub use memory_store::MemoryStore;
