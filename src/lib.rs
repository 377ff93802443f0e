// src/lib.rs
//
// Phonetic fuzzy suggestions for native-script (Malayalam) voter names and
// house names typed as Latin-script fragments.
//
// Flow: record source -> glyph mapper -> phonetic index (build time);
// query -> suggestion engine over the published index snapshot.

pub mod config;
pub mod error;
pub mod glyph_mapper;
pub mod index_store;
pub mod numeric_lookup;
pub mod phonetic_index;
pub mod record_source;
pub mod refresh;
pub mod similarity;
pub mod suggestion_engine;

pub use error::{Error, Result};
pub use index_store::{IndexSnapshot, IndexStore};
pub use numeric_lookup::NumericIndex;
pub use phonetic_index::PhoneticIndex;
pub use record_source::{JsonPartitionSource, MemoryPartition, MemorySource, RecordSource};
pub use refresh::IndexRefresher;
pub use suggestion_engine::{MatchConfig, Suggestion, SuggestionEngine};
