// src/record_source.rs
//
// Access to the record store that supplies distinct column values.
// Each partition is an independent shard (one polling booth's voter rows);
// the index build queries every partition and merges the results.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A store of voter records split into partitions.
pub trait RecordSource: Send + Sync {
    /// Names of the partitions, in the order they should be merged.
    fn partitions(&self) -> Vec<String>;

    /// Distinct values of `column` in one partition. `None` marks a null cell.
    fn list_distinct(&self, column: &str, partition: &str) -> Result<Vec<Option<String>>>;

    /// Column holding numeric identifiers (house numbers).
    fn numeric_column(&self) -> &str;

    /// Distinct, trimmed, non-empty numeric identifiers of one partition.
    fn numeric_identifier_values(&self, partition: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let values = self
            .list_distinct(self.numeric_column(), partition)?
            .into_iter()
            .flatten()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty() && seen.insert(value.clone()))
            .collect();
        Ok(values)
    }
}

/// Keep the first occurrence of every value.
fn distinct_in_order(values: impl IntoIterator<Item = Option<String>>) -> Vec<Option<String>> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Partition held in memory as column -> cell values.
#[derive(Debug, Clone, Default)]
pub struct MemoryPartition {
    columns: HashMap<String, Vec<Option<String>>>,
}

impl MemoryPartition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for filling a column with non-null values.
    pub fn with_column<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns
            .entry(column.to_string())
            .or_default()
            .extend(values.into_iter().map(|value| Some(value.into())));
        self
    }

    pub fn push(&mut self, column: &str, value: Option<String>) {
        self.columns.entry(column.to_string()).or_default().push(value);
    }
}

/// In-memory record source, mostly for tests and embedding callers.
#[derive(Debug, Clone)]
pub struct MemorySource {
    partitions: Vec<(String, MemoryPartition)>,
    numeric_column: String,
}

impl MemorySource {
    pub fn new(numeric_column: &str) -> Self {
        Self {
            partitions: Vec::new(),
            numeric_column: numeric_column.to_string(),
        }
    }

    pub fn with_partition(mut self, name: &str, partition: MemoryPartition) -> Self {
        self.partitions.push((name.to_string(), partition));
        self
    }
}

impl RecordSource for MemorySource {
    fn partitions(&self) -> Vec<String> {
        self.partitions.iter().map(|(name, _)| name.clone()).collect()
    }

    fn list_distinct(&self, column: &str, partition: &str) -> Result<Vec<Option<String>>> {
        let (_, data) = self
            .partitions
            .iter()
            .find(|(name, _)| name == partition)
            .ok_or_else(|| Error::UnknownPartition(partition.to_string()))?;
        let values = data
            .columns
            .get(column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string()))?;
        Ok(distinct_in_order(values.iter().cloned()))
    }

    fn numeric_column(&self) -> &str {
        &self.numeric_column
    }
}

/// Record source backed by one JSON file per partition.
///
/// Every file holds an array of voter records (JSON objects). The partition
/// name is the file path as configured.
#[derive(Debug, Clone)]
pub struct JsonPartitionSource {
    files: Vec<PathBuf>,
    numeric_column: String,
}

impl JsonPartitionSource {
    pub fn new(files: Vec<PathBuf>, numeric_column: &str) -> Self {
        Self {
            files,
            numeric_column: numeric_column.to_string(),
        }
    }

    fn file_for(&self, partition: &str) -> Result<&Path> {
        self.files
            .iter()
            .find(|path| path.to_string_lossy() == partition)
            .map(PathBuf::as_path)
            .ok_or_else(|| Error::UnknownPartition(partition.to_string()))
    }

    fn read_records(path: &Path) -> Result<Vec<Map<String, Value>>> {
        let data = fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new()); // Handle empty file case
        }
        Ok(serde_json::from_str(&data)?)
    }
}

/// Render a JSON cell as text; nulls and nested structures have no text form.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl RecordSource for JsonPartitionSource {
    fn partitions(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect()
    }

    fn list_distinct(&self, column: &str, partition: &str) -> Result<Vec<Option<String>>> {
        let path = self.file_for(partition)?;
        let records = Self::read_records(path)?;

        if !records.is_empty() && !records.iter().any(|record| record.contains_key(column)) {
            return Err(Error::UnknownColumn(column.to_string()));
        }

        let cells = records
            .iter()
            .map(|record| record.get(column).and_then(cell_text));
        let values = distinct_in_order(cells);
        log::debug!(
            "[RecordSource] {} distinct '{}' values in {}",
            values.len(),
            column,
            partition
        );
        Ok(values)
    }

    fn numeric_column(&self) -> &str {
        &self.numeric_column
    }
}
