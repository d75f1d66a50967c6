pub mod history;
mod history_data;
pub mod kv;

pub use history::{
    CorruptHistoryError, HistoryEntry, HistoryStore, PersistenceWriteError, Recorded,
    DEFAULT_CAPACITY, STORAGE_KEY,
};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
