// src/index_store.rs
//
// Published index snapshots. Queries read the current snapshot without
// taking a lock; a rebuild assembles a complete snapshot on its own and then
// swaps it in, so readers never see a half-built index.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::numeric_lookup::NumericIndex;
use crate::phonetic_index::PhoneticIndex;
use crate::record_source::RecordSource;

/// Immutable set of indexes for every tracked column.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    columns: HashMap<String, PhoneticIndex>,
    numeric: NumericIndex,
    numeric_column: String,
    built_at: DateTime<Utc>,
    generation: u64,
}

/// Size summary of a snapshot, for logs and tooling.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStats {
    pub generation: u64,
    pub built_at: DateTime<Utc>,
    /// column -> (phonetic keys, distinct values)
    pub columns: HashMap<String, (usize, usize)>,
    pub numeric_identifiers: usize,
}

impl IndexSnapshot {
    pub fn new(columns: Vec<PhoneticIndex>, numeric: NumericIndex, numeric_column: &str) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|index| (index.column().to_string(), index))
                .collect(),
            numeric,
            numeric_column: numeric_column.to_string(),
            built_at: Utc::now(),
            generation: 0,
        }
    }

    /// Snapshot that tracks the given columns but holds no values yet.
    pub fn empty(text_columns: &[String], numeric_column: &str) -> Self {
        let columns = text_columns.iter().map(|column| PhoneticIndex::new(column)).collect();
        Self::new(columns, NumericIndex::new(), numeric_column)
    }

    /// Build every index from the record source.
    pub fn build(source: &dyn RecordSource, text_columns: &[String]) -> Self {
        let columns = text_columns
            .iter()
            .map(|column| PhoneticIndex::build(column, source))
            .collect();
        let numeric = NumericIndex::build(source);
        Self::new(columns, numeric, source.numeric_column())
    }

    /// Phonetic index of a tracked column.
    pub fn column(&self, name: &str) -> Result<&PhoneticIndex> {
        self.columns
            .get(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn numeric(&self) -> &NumericIndex {
        &self.numeric
    }

    pub fn numeric_column(&self) -> &str {
        &self.numeric_column
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Publish counter; 0 for a snapshot that was never published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            generation: self.generation,
            built_at: self.built_at,
            columns: self
                .columns
                .iter()
                .map(|(name, index)| (name.clone(), (index.key_count(), index.value_count())))
                .collect(),
            numeric_identifiers: self.numeric.len(),
        }
    }
}

/// Holder of the currently published snapshot.
pub struct IndexStore {
    current: ArcSwap<IndexSnapshot>,
    generation: AtomicU64,
}

impl IndexStore {
    /// Publish `snapshot` as the first generation.
    pub fn new(mut snapshot: IndexSnapshot) -> Self {
        snapshot.generation = 1;
        Self {
            current: ArcSwap::from_pointee(snapshot),
            generation: AtomicU64::new(1),
        }
    }

    /// Current snapshot. Callers keep it alive for as long as they need it,
    /// even across a concurrent publish.
    pub fn load(&self) -> Arc<IndexSnapshot> {
        self.current.load_full()
    }

    /// Replace the published snapshot wholesale; returns its generation.
    pub fn publish(&self, mut snapshot: IndexSnapshot) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        snapshot.generation = generation;
        self.current.store(Arc::new(snapshot));
        log::info!("[IndexStore] Published snapshot generation {}", generation);
        generation
    }

    /// Build a fresh snapshot from `source` and publish it.
    pub fn rebuild(&self, source: &dyn RecordSource, text_columns: &[String]) -> u64 {
        let start_time = Instant::now();
        let snapshot = IndexSnapshot::build(source, text_columns);
        log::info!(
            "[IndexStore] Rebuilt {} columns in {}ms",
            text_columns.len(),
            start_time.elapsed().as_millis()
        );
        self.publish(snapshot)
    }
}
