// tasklist - Single-user task list persisted in a local key-value store

pub mod config;
pub mod filter;
pub mod jsonl;
pub mod kv;
pub mod list;
pub mod models;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use filter::{FilterMode, view};
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use list::{Action, TaskList};
pub use models::{Priority, Task, TaskId};
pub use record::Record;
pub use store::{Store, StoreOptions};
