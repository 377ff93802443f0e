// src/phonetic_index.rs
//
// Per-column index from phonetic key to the distinct original strings that
// produce it. Built once from every partition of the record source and
// treated as read-only afterwards; a rebuild produces a fresh index.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use crate::glyph_mapper;
use crate::record_source::RecordSource;

/// Phonetic index for one tracked column.
#[derive(Debug, Clone, Default)]
pub struct PhoneticIndex {
    column: String,
    /// phonetic key -> original values sharing that key
    entries: HashMap<String, BTreeSet<String>>,
    value_count: usize,
}

impl PhoneticIndex {
    /// Empty index for `column`.
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ..Self::default()
        }
    }

    /// Build the index for `column` from every partition of `source`.
    ///
    /// A partition that cannot be queried contributes no rows; the build
    /// carries on with the remaining partitions.
    pub fn build(column: &str, source: &dyn RecordSource) -> Self {
        let start_time = Instant::now();
        let mut index = Self::new(column);
        let mut seen = HashSet::new();

        for partition in source.partitions() {
            let rows = match source.list_distinct(column, &partition) {
                Ok(rows) => rows,
                Err(e) => {
                    log::warn!(
                        "[PhoneticIndex] Skipping partition '{}' for column '{}': {}",
                        partition,
                        column,
                        e
                    );
                    Vec::new()
                }
            };

            for value in rows.into_iter().flatten() {
                let value = value.trim();
                if value.is_empty() || !seen.insert(value.to_string()) {
                    continue;
                }
                index.insert(value);
            }
        }

        log::info!(
            "[PhoneticIndex] Built '{}': {} keys, {} values in {}ms",
            column,
            index.key_count(),
            index.value_count(),
            start_time.elapsed().as_millis()
        );
        index
    }

    /// Build an index straight from a list of values (no partitions).
    pub fn from_values<I, S>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new(column);
        for value in values {
            let value = value.as_ref().trim();
            if !value.is_empty() {
                index.insert(value);
            }
        }
        index
    }

    /// Add one trimmed, non-empty value. Values whose key is empty are ignored.
    fn insert(&mut self, value: &str) -> bool {
        let key = glyph_mapper::normalize(value);
        if key.is_empty() {
            return false;
        }
        let inserted = self.entries.entry(key).or_default().insert(value.to_string());
        if inserted {
            self.value_count += 1;
        }
        inserted
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Values stored under exactly this key.
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Iterate over (key, values) pairs in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(key, values)| (key.as_str(), values))
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every indexed value, sorted, for pre-populating selection lists.
    pub fn all_values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self
            .entries
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect();
        values.sort_unstable();
        values
    }
}
