//! The calculation history
//!
//! A [`HistoryStore`] keeps the most recent calculations, newest first, and
//! mirrors them into a [`KeyValueStore`] after every change. The whole log is
//! written as one JSON document under [`STORAGE_KEY`].
//!
//! Recording the same input twice in a row only keeps the first calculation.
//! Failing to persist never loses the in-memory log: the next successful write
//! brings the store back in line.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::{
    domain::{CalculationInput, CalculationResult},
    storage::{
        history_data::EntryData,
        kv::{KeyValueStore, StoreError},
    },
};

/// The key the history document is stored under.
pub const STORAGE_KEY: &str = "work-time-calculator-history";

/// The number of entries kept unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

/// One past calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub(crate) id: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) input: CalculationInput,
    pub(crate) result: CalculationResult,
}

impl HistoryEntry {
    fn new(input: CalculationInput, result: CalculationResult) -> Self {
        // stored with millisecond precision
        let created_at = Utc::now().trunc_subsecs(3);
        Self {
            id: generate_id(created_at),
            created_at,
            input,
            result,
        }
    }

    /// Opaque identifier, unique within the history.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the calculation was recorded.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The input as it was entered.
    #[must_use]
    pub const fn input(&self) -> &CalculationInput {
        &self.input
    }

    /// The result computed at the time.
    #[must_use]
    pub const fn result(&self) -> &CalculationResult {
        &self.result
    }
}

/// Creation time in epoch milliseconds followed by 9 random hex digits.
///
/// Collisions are not checked for.
fn generate_id(created_at: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", created_at.timestamp_millis(), &random[..9])
}

/// What happened when a calculation was recorded.
#[derive(Debug)]
#[must_use]
pub struct Recorded {
    /// `false` if the input repeated the most recent entry and nothing was
    /// added.
    pub was_recorded: bool,
    /// Set if the history changed in memory but could not be written to the
    /// store.
    pub persist_error: Option<PersistenceWriteError>,
}

/// The stored history could not be read back.
///
/// The history starts over from an empty log when this happens.
#[derive(Debug, thiserror::Error)]
pub enum CorruptHistoryError {
    /// The store could not be read.
    #[error("failed to read stored history: {0}")]
    Read(#[source] StoreError),

    /// The stored document is not valid JSON.
    #[error("stored history is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The stored document is valid JSON, but not a list.
    #[error("stored history is not a list of entries")]
    NotAList,
}

/// The history could not be written to the store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceWriteError {
    /// The log could not be serialized.
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store rejected the write.
    #[error("failed to write history: {0}")]
    Write(#[from] StoreError),
}

/// A bounded, newest-first log of calculations backed by a key-value store.
#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Opens the history kept in `store`, with the default capacity.
    ///
    /// See [`HistoryStore::with_capacity`].
    pub fn open(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY)
    }

    /// Opens the history kept in `store`, keeping at most `capacity` entries.
    ///
    /// The capacity is clamped between 1 and [`DEFAULT_CAPACITY`].
    ///
    /// Unreadable history is logged and replaced by an empty log. Call
    /// [`HistoryStore::load_history`] to get hold of the error.
    pub fn with_capacity(store: S, capacity: usize) -> Self {
        let mut history = Self {
            store,
            entries: Vec::new(),
            capacity: capacity.clamp(1, DEFAULT_CAPACITY),
        };
        // already logged
        let _ = history.load_history();
        history
    }

    /// Replaces the in-memory log with the content of the store.
    ///
    /// A missing document yields an empty log. Records that fail validation
    /// are dropped one by one; the rest are kept. Entries beyond the capacity
    /// are discarded.
    ///
    /// # Errors
    ///
    /// Returns a [`CorruptHistoryError`] if the store cannot be read or the
    /// document is not a JSON list. The log is empty in that case.
    pub fn load_history(&mut self) -> Result<&[HistoryEntry], CorruptHistoryError> {
        self.entries.clear();

        match self.read_entries() {
            Ok(entries) => {
                self.entries = entries;
                self.entries.truncate(self.capacity);
                tracing::debug!("Loaded {} history entries", self.entries.len());
                Ok(&self.entries)
            }
            Err(e) => {
                tracing::warn!("Discarding stored history: {e}");
                Err(e)
            }
        }
    }

    fn read_entries(&self) -> Result<Vec<HistoryEntry>, CorruptHistoryError> {
        let Some(content) = self
            .store
            .get(STORAGE_KEY)
            .map_err(CorruptHistoryError::Read)?
        else {
            return Ok(Vec::new());
        };

        let document: serde_json::Value = serde_json::from_str(&content)?;
        let serde_json::Value::Array(records) = document else {
            return Err(CorruptHistoryError::NotAList);
        };

        let entries = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let entry = serde_json::from_value::<EntryData>(record)
                    .map_err(|e| e.to_string())
                    .and_then(|data| HistoryEntry::try_from(data).map_err(|e| e.to_string()));
                match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!("Dropping invalid history entry #{index}: {e}");
                        None
                    }
                }
            })
            .collect();

        Ok(entries)
    }

    /// Adds a calculation to the front of the log and persists the log.
    ///
    /// Nothing is added if `input` is identical to the input of the most
    /// recent entry. Older entries fall off the end once the log is full.
    ///
    /// If the store cannot be written, the entry is still kept in memory and
    /// the error is reported in [`Recorded::persist_error`].
    pub fn record_calculation(
        &mut self,
        input: CalculationInput,
        result: CalculationResult,
    ) -> Recorded {
        if self
            .most_recent()
            .is_some_and(|entry| entry.input == input)
        {
            tracing::debug!("Input repeats the most recent calculation, not recording");
            return Recorded {
                was_recorded: false,
                persist_error: None,
            };
        }

        let entry = HistoryEntry::new(input, result);
        tracing::info!("Recording calculation {}", entry.id);
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);

        Recorded {
            was_recorded: true,
            persist_error: self.persist().err(),
        }
    }

    /// Empties the log and persists the empty log.
    ///
    /// # Errors
    ///
    /// Returns an error if the empty log cannot be written. The in-memory log
    /// is empty regardless.
    pub fn clear_history(&mut self) -> Result<(), PersistenceWriteError> {
        tracing::info!("Clearing {} history entries", self.entries.len());
        self.entries.clear();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), PersistenceWriteError> {
        let records: Vec<EntryData> = self.entries.iter().map(EntryData::from).collect();
        let result = serde_json::to_string(&records)
            .map_err(PersistenceWriteError::from)
            .and_then(|document| {
                self.store
                    .set(STORAGE_KEY, &document)
                    .map_err(PersistenceWriteError::from)
            });

        if let Err(e) = &result {
            tracing::error!("Failed to persist history: {e}");
        }
        result
    }

    /// The most recent entry, if any.
    #[must_use]
    pub fn most_recent(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    /// Finds an entry by id, or by a prefix matching exactly one id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        if let Some(entry) = self.entries.iter().find(|entry| entry.id == id) {
            return Some(entry);
        }

        let mut matches = self.entries.iter().filter(|entry| entry.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Some(entry),
            _ => None,
        }
    }

    /// All entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The maximum number of entries kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_result, storage::MemoryStore};

    fn input(price: &str) -> CalculationInput {
        CalculationInput::new("4300", price, "8", "5")
    }

    fn record(history: &mut HistoryStore<MemoryStore>, price: &str) -> Recorded {
        let input = input(price);
        let result = compute_result(&input).unwrap();
        history.record_calculation(input, result)
    }

    /// A store whose writes can be made to fail.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn starts_empty() {
        let history = HistoryStore::open(MemoryStore::new());
        assert!(history.is_empty());
        assert!(history.most_recent().is_none());
    }

    #[test]
    fn repeated_input_is_recorded_once() {
        let mut history = HistoryStore::open(MemoryStore::new());

        assert!(record(&mut history, "120").was_recorded);
        assert!(!record(&mut history, "120").was_recorded);

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn only_the_most_recent_entry_is_deduplicated() {
        let mut history = HistoryStore::open(MemoryStore::new());

        let _ = record(&mut history, "120");
        let _ = record(&mut history, "80");
        let _ = record(&mut history, "120");

        let prices: Vec<_> = history
            .entries()
            .iter()
            .map(|entry| entry.input().item_price())
            .collect();
        assert_eq!(prices, ["120", "80", "120"]);
    }

    #[test]
    fn inputs_are_compared_as_entered() {
        let mut history = HistoryStore::open(MemoryStore::new());

        let _ = record(&mut history, "120");
        assert!(record(&mut history, "120.0").was_recorded);
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut history = HistoryStore::open(MemoryStore::new());

        let _ = record(&mut history, "120");
        let _ = record(&mut history, "80");

        assert_eq!(history.len(), 2);
        assert_eq!(history.most_recent().unwrap().input().item_price(), "80");
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut history = HistoryStore::open(MemoryStore::new());

        for price in 1..=25 {
            let _ = record(&mut history, &price.to_string());
            assert!(history.len() <= DEFAULT_CAPACITY);
        }

        assert_eq!(history.len(), DEFAULT_CAPACITY);
        assert_eq!(history.most_recent().unwrap().input().item_price(), "25");
        assert_eq!(history.entries()[9].input().item_price(), "16");
    }

    #[test]
    fn configured_capacity_never_exceeds_ten() {
        let mut history = HistoryStore::with_capacity(MemoryStore::new(), 20);
        assert_eq!(history.capacity(), DEFAULT_CAPACITY);

        for price in 1..=25 {
            let _ = record(&mut history, &price.to_string());
        }

        assert_eq!(history.len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn entries_survive_reopening() {
        let mut history = HistoryStore::open(MemoryStore::new());
        let _ = record(&mut history, "120");
        let _ = record(&mut history, "80");
        let original = history.entries().to_vec();

        let reopened = HistoryStore::open(history.store);

        assert_eq!(reopened.entries(), original.as_slice());
    }

    #[test]
    fn load_after_clear_is_empty() {
        let mut history = HistoryStore::open(MemoryStore::new());
        let _ = record(&mut history, "120");

        history.clear_history().unwrap();

        assert!(history.load_history().unwrap().is_empty());
        assert_eq!(
            history.store.get(STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn malformed_document_gives_empty_history() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "{not json").unwrap();

        let mut history = HistoryStore::open(store);
        assert!(history.is_empty());
        assert!(matches!(
            history.load_history(),
            Err(CorruptHistoryError::Malformed(_))
        ));
    }

    #[test]
    fn non_list_document_gives_empty_history() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, r#"{"id": "1"}"#).unwrap();

        let mut history = HistoryStore::open(store);
        assert!(matches!(
            history.load_history(),
            Err(CorruptHistoryError::NotAList)
        ));
        assert!(history.is_empty());
    }

    #[test]
    fn invalid_records_are_dropped_individually() {
        let mut history = HistoryStore::open(MemoryStore::new());
        let _ = record(&mut history, "120");

        let stored = history.store.get(STORAGE_KEY).unwrap().unwrap();
        let mut records: Vec<serde_json::Value> = serde_json::from_str(&stored).unwrap();
        records.push(serde_json::json!({"id": "broken"}));
        records.push(serde_json::json!(42));
        history
            .store
            .set(STORAGE_KEY, &serde_json::to_string(&records).unwrap())
            .unwrap();

        assert_eq!(history.load_history().unwrap().len(), 1);
    }

    #[test]
    fn oversized_document_is_truncated() {
        let mut history = HistoryStore::open(MemoryStore::new());
        for price in 1..=5 {
            let _ = record(&mut history, &price.to_string());
        }

        let reopened = HistoryStore::with_capacity(history.store, 3);

        assert_eq!(reopened.len(), 3);
        assert_eq!(reopened.most_recent().unwrap().input().item_price(), "5");
    }

    #[test]
    fn write_failure_keeps_the_entry_in_memory() {
        let mut history = HistoryStore::open(FlakyStore::default());
        history.store.fail_writes = true;

        let input = input("120");
        let result = compute_result(&input).unwrap();
        let outcome = history.record_calculation(input, result);

        assert!(outcome.was_recorded);
        assert!(matches!(
            outcome.persist_error,
            Some(PersistenceWriteError::Write(StoreError::Unavailable(_)))
        ));
        assert_eq!(history.len(), 1);
        assert_eq!(history.store.inner.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn next_successful_write_reconciles_the_store() {
        let mut history = HistoryStore::open(FlakyStore::default());
        history.store.fail_writes = true;
        let first = input("120");
        let _ = history.record_calculation(first.clone(), compute_result(&first).unwrap());

        history.store.fail_writes = false;
        let second = input("80");
        let outcome = history.record_calculation(second.clone(), compute_result(&second).unwrap());
        assert!(outcome.persist_error.is_none());

        let reopened = HistoryStore::open(history.store);
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn ids_are_unique() {
        let mut history = HistoryStore::open(MemoryStore::new());
        for price in 1..=10 {
            let _ = record(&mut history, &price.to_string());
        }

        let mut ids: Vec<_> = history.entries().iter().map(HistoryEntry::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn find_by_id_or_unique_prefix() {
        let mut history = HistoryStore::open(MemoryStore::new());
        let _ = record(&mut history, "120");
        let _ = record(&mut history, "80");

        let newest = history.entries()[0].id().to_string();
        assert_eq!(history.find(&newest).unwrap().input().item_price(), "80");

        assert!(history.find("").is_none());
        assert!(history.find("no-such-id").is_none());
    }
}
