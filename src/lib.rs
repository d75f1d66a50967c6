//! Work-time cost calculation
//!
//! Prices are expressed as the amount of work it takes to earn them, given a
//! monthly income and a weekly schedule. Past calculations are kept in a
//! small rolling history that feeds comparison and trend reports.

pub mod domain;
pub use domain::{
    CalculationInput, CalculationResult, Config, HourlyRate, InvalidInputError, ParsedInput,
    TimeBreakdown, compute_result,
};

/// Persistence of the calculation history in a key-value store.
pub mod storage;
pub use storage::{
    CorruptHistoryError, FileStore, HistoryEntry, HistoryStore, KeyValueStore, MemoryStore,
    PersistenceWriteError, Recorded, StoreError,
};

/// Summary statistics derived from the calculation history.
pub mod metrics;
