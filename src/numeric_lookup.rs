// src/numeric_lookup.rs
//
// Substring lookup for house numbers. No transliteration is involved: the
// query is matched against the literal stored identifiers.

use std::collections::BTreeSet;

use crate::record_source::RecordSource;
use crate::suggestion_engine::{rank, Suggestion};

/// Score for a stored identifier equal to the query.
const EXACT_SCORE: f64 = 1.0;
/// Score for a stored identifier merely containing the query.
const PARTIAL_SCORE: f64 = 0.7;

/// Distinct numeric identifiers across all partitions.
#[derive(Debug, Clone, Default)]
pub struct NumericIndex {
    values: BTreeSet<String>,
}

impl NumericIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect identifiers from every partition; failing partitions are skipped.
    pub fn build(source: &dyn RecordSource) -> Self {
        let mut index = Self::new();
        for partition in source.partitions() {
            match source.numeric_identifier_values(&partition) {
                Ok(values) => index.extend(values),
                Err(e) => log::warn!(
                    "[NumericIndex] Skipping partition '{}' for column '{}': {}",
                    partition,
                    source.numeric_column(),
                    e
                ),
            }
        }
        log::info!("[NumericIndex] Built with {} identifiers", index.len());
        index
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new();
        index.extend(values);
        index
    }

    fn extend<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            let value: String = value.into();
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                self.values.insert(trimmed.to_string());
            }
        }
    }

    /// Identifiers containing the trimmed query, best first.
    ///
    /// Exact equality scores 1.0 and partial containment 0.7; equal scores are
    /// ordered lexically. An empty query yields nothing.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let matches = self
            .values
            .iter()
            .filter(|value| value.contains(query))
            .map(|value| {
                let score = if value == query { EXACT_SCORE } else { PARTIAL_SCORE };
                Suggestion::new(value.clone(), score)
            })
            .collect();

        rank(matches, limit)
    }

    /// All identifiers in ascending order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
