// src/suggestion_engine.rs
//
// Phonetic fuzzy suggestions: match a Latin-script query fragment against the
// phonetic keys of a column and return the original native-script strings,
// best first.
//
// Matching runs as two explicit passes. The strict pass scores every key by
// prefix, substring or weighted similarity; only when it finds nothing does
// the relaxed pass rescan with a looser similarity threshold.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index_store::IndexStore;
use crate::phonetic_index::PhoneticIndex;
use crate::similarity::similarity;

/// Everything outside the key alphabet, removed from lowercased queries.
static QUERY_STRIP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Scoring constants for the matching tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub prefix_score: f64,           // key starts with the query
    pub substring_score: f64,        // query found inside the key
    pub fuzzy_weight: f64,           // multiplier on similarity in the strict pass
    pub strict_min_score: f64,       // strict pass keeps scores >= this
    pub relaxed_min_similarity: f64, // relaxed pass keeps similarity >= this
    pub relaxed_weight: f64,         // multiplier on similarity in the relaxed pass
    pub exact_key_floor: f64,        // floor when the query equals the key
    pub literal_score: f64,          // query is the stored string itself
    pub include_phonetic: bool,      // attach matched keys to suggestions
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            prefix_score: 1.0,
            substring_score: 0.88,
            fuzzy_weight: 0.9,
            strict_min_score: 0.45,
            relaxed_min_similarity: 0.30,
            relaxed_weight: 0.8,
            exact_key_floor: 0.995,
            literal_score: 0.9999,
            include_phonetic: false,
        }
    }
}

/// A ranked suggestion handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: String,
    pub score: f64,
    /// Matched phonetic key, only filled in for debugging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
}

impl Suggestion {
    pub fn new(value: String, score: f64) -> Self {
        Self {
            value,
            score,
            phonetic: None,
        }
    }
}

/// A value reached through one key during a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub value: &'a str,
    pub key: &'a str,
    pub score: f64,
}

/// Lowercase the query and strip everything outside `[a-z0-9]`.
pub fn normalize_query(raw_query: &str) -> String {
    QUERY_STRIP_PATTERN
        .replace_all(&raw_query.to_lowercase(), "")
        .into_owned()
}

/// Strict pass: prefix, then substring, then weighted similarity.
pub fn strict_pass<'a>(index: &'a PhoneticIndex, query_key: &str, config: &MatchConfig) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::new();

    for (key, values) in index.entries() {
        let score = if key.starts_with(query_key) {
            config.prefix_score
        } else if key.contains(query_key) {
            config.substring_score
        } else {
            similarity(query_key, key) * config.fuzzy_weight
        };

        if score >= config.strict_min_score {
            candidates.extend(values.iter().map(|value| Candidate {
                value: value.as_str(),
                key,
                score,
            }));
        }
    }

    candidates
}

/// Relaxed pass: plain similarity against a looser threshold, down-weighted.
pub fn relaxed_pass<'a>(index: &'a PhoneticIndex, query_key: &str, config: &MatchConfig) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::new();

    for (key, values) in index.entries() {
        let sim = similarity(query_key, key);
        if sim >= config.relaxed_min_similarity {
            let score = sim * config.relaxed_weight;
            candidates.extend(values.iter().map(|value| Candidate {
                value: value.as_str(),
                key,
                score,
            }));
        }
    }

    candidates
}

/// Apply the exact-key and literal boosts, keeping the best score per value.
pub fn calibrate(
    candidates: &[Candidate<'_>],
    query_key: &str,
    raw_query: &str,
    config: &MatchConfig,
) -> Vec<Suggestion> {
    let literal = raw_query.trim();
    // value -> (best score, key it was reached through)
    let mut best: HashMap<&str, (f64, &str)> = HashMap::new();

    for candidate in candidates {
        let mut score = candidate.score;
        if query_key == candidate.key {
            score = score.max(config.exact_key_floor);
        }
        if literal == candidate.value {
            score = config.literal_score;
        }

        let improves = best
            .get(candidate.value)
            .map_or(true, |(previous, _)| score > *previous);
        if improves {
            best.insert(candidate.value, (score, candidate.key));
        }
    }

    best.into_iter()
        .map(|(value, (score, key))| Suggestion {
            value: value.to_string(),
            score,
            phonetic: config.include_phonetic.then(|| key.to_string()),
        })
        .collect()
}

/// Round scores to 4 decimals, sort best first (ties lexically), truncate.
pub fn rank(mut suggestions: Vec<Suggestion>, limit: usize) -> Vec<Suggestion> {
    for suggestion in &mut suggestions {
        suggestion.score = (suggestion.score * 10_000.0).round() / 10_000.0;
    }
    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.value.cmp(&b.value)));
    suggestions.truncate(limit);
    suggestions
}

/// Run the full matching pipeline against one column's index.
pub fn suggest_in(index: &PhoneticIndex, raw_query: &str, limit: usize, config: &MatchConfig) -> Vec<Suggestion> {
    let query_key = normalize_query(raw_query);
    if query_key.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut candidates = strict_pass(index, &query_key, config);
    if candidates.is_empty() {
        log::debug!(
            "[SuggestionEngine] No strict match for '{}' in '{}', relaxing threshold",
            query_key,
            index.column()
        );
        candidates = relaxed_pass(index, &query_key, config);
    }

    let suggestions = calibrate(&candidates, &query_key, raw_query, config);
    rank(suggestions, limit)
}

/// Query front-end over the currently published index snapshot.
pub struct SuggestionEngine {
    store: Arc<IndexStore>,
    config: MatchConfig,
}

impl SuggestionEngine {
    pub fn new(store: Arc<IndexStore>, config: MatchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Ranked suggestions for a Latin-script query against a tracked column.
    ///
    /// Fails only when `column` is not tracked; every kind of non-match is an
    /// empty list.
    pub fn suggest(&self, raw_query: &str, column: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let start_time = Instant::now();
        let snapshot = self.store.load();
        let index = snapshot.column(column)?;

        let results = suggest_in(index, raw_query, limit, &self.config);

        let duration = start_time.elapsed();
        if duration.as_millis() > 50 {
            log::warn!(
                "[SuggestionEngine] Query '{}' on '{}' took {}ms over {} keys",
                raw_query,
                column,
                duration.as_millis(),
                index.key_count()
            );
        }
        Ok(results)
    }

    /// Substring suggestions over numeric identifiers (house numbers).
    pub fn numeric_suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.store.load().numeric().suggest(query, limit)
    }

    /// Dispatch a query by search type: the numeric column or a tracked text column.
    pub fn search(&self, raw_query: &str, search_type: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let search_type = search_type.trim();
        let snapshot = self.store.load();

        if search_type == snapshot.numeric_column() {
            return Ok(snapshot.numeric().suggest(raw_query, limit));
        }
        // Validate the column before looking at the query
        snapshot.column(search_type)?;

        if raw_query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.suggest(raw_query.trim(), search_type, limit)
    }

    /// Sorted stored values of a column, for pre-populating selection lists.
    pub fn values(&self, column: &str, limit: usize) -> Result<Vec<String>> {
        let snapshot = self.store.load();
        let column = column.trim();

        if column == snapshot.numeric_column() {
            return Ok(snapshot.numeric().values().take(limit).map(str::to_string).collect());
        }
        let index = snapshot.column(column)?;
        Ok(index.all_values().into_iter().take(limit).map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::index_store::IndexSnapshot;
    use crate::numeric_lookup::NumericIndex;
    use proptest::prelude::*;

    fn index(values: &[&str]) -> PhoneticIndex {
        PhoneticIndex::from_values("name", values.iter().copied())
    }

    fn engine() -> SuggestionEngine {
        let snapshot = IndexSnapshot::new(
            vec![
                index(&["മല", "മാല", "ഷാജി"]),
                PhoneticIndex::from_values("house_name", ["വീട്", "Rose Villa"]),
            ],
            NumericIndex::from_values(["12A", "112", "12"]),
            "house_no",
        );
        SuggestionEngine::new(Arc::new(IndexStore::new(snapshot)), MatchConfig::default())
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("Mal"), "mal");
        assert_eq!(normalize_query("  Rose-Villa 2 "), "rosevilla2");
        assert_eq!(normalize_query("മല"), "");
        assert_eq!(normalize_query("!?"), "");
    }

    #[test]
    fn test_prefix_match_ranks_first() {
        let idx = index(&["മല", "ഷാജി"]);
        let results = suggest_in(&idx, "mal", 25, &MatchConfig::default());
        assert_eq!(results[0], Suggestion::new("മല".to_string(), 1.0));
    }

    #[test]
    fn test_fuzzy_match_at_threshold_boundary() {
        // similarity("amla", "mala") = 0.5, scaled by 0.9 -> exactly 0.45
        let idx = index(&["മല"]);
        let config = MatchConfig::default();
        let strict = strict_pass(&idx, "amla", &config);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].value, "മല");
        assert!((strict[0].score - 0.45).abs() < 1e-12);

        let results = suggest_in(&idx, "amla", 25, &config);
        assert_eq!(results, vec![Suggestion::new("മല".to_string(), 0.45)]);
    }

    #[test]
    fn test_strict_pass_tiers() {
        let idx = index(&["മല", "അമല", "ഷാജി"]); // mala, amala, shaajai
        let config = MatchConfig::default();
        let mut scored: Vec<(&str, f64)> = strict_pass(&idx, "mala", &config)
            .into_iter()
            .map(|c| (c.key, c.score))
            .collect();
        scored.sort_by(|a, b| a.0.cmp(b.0));
        assert_eq!(scored, vec![("amala", 0.88), ("mala", 1.0)]);
    }

    #[test]
    fn test_relaxed_pass_only_when_strict_is_empty() {
        let idx = index(&["മാല"]); // maala
        let config = MatchConfig::default();
        // similarity("mxxla", "maala") = 0.6 -> strict 0.54, kept
        assert_eq!(strict_pass(&idx, "mxxla", &config).len(), 1);

        // similarity("xyzla", "maala") = 0.4 -> strict 0.36 rejected
        assert!(strict_pass(&idx, "xyzla", &config).is_empty());
        let relaxed = relaxed_pass(&idx, "xyzla", &config);
        assert_eq!(relaxed.len(), 1);
        assert!((relaxed[0].score - 0.32).abs() < 1e-9);

        let results = suggest_in(&idx, "xyzla", 25, &config);
        assert_eq!(results, vec![Suggestion::new("മാല".to_string(), 0.32)]);
    }

    #[test]
    fn test_relaxed_pass_threshold() {
        let idx = index(&["മാല"]); // maala
        // similarity("qqqqa", "maala") = 0.2, below the relaxed threshold
        assert!(relaxed_pass(&idx, "qqqqa", &MatchConfig::default()).is_empty());
        assert!(suggest_in(&idx, "qqqqa", 25, &MatchConfig::default()).is_empty());
    }

    #[test]
    fn test_exact_key_floor() {
        let config = MatchConfig::default();
        let candidates = vec![Candidate { value: "മല", key: "mala", score: 0.88 }];
        let calibrated = calibrate(&candidates, "mala", "mala", &config);
        assert_eq!(calibrated[0].score, 0.995);

        // A prefix score of 1.0 is not lowered by the floor
        let candidates = vec![Candidate { value: "മല", key: "mala", score: 1.0 }];
        assert_eq!(calibrate(&candidates, "mala", "mala", &config)[0].score, 1.0);
    }

    #[test]
    fn test_literal_hit() {
        let idx = index(&["Rose", "Rosa"]);
        let results = suggest_in(&idx, "Rose", 25, &MatchConfig::default());
        assert_eq!(results[0], Suggestion::new("Rose".to_string(), 0.9999));
        assert_eq!(results[1].value, "Rosa");
        assert_eq!(results[1].score, 0.675);
    }

    #[test]
    fn test_dedup_keeps_best_score() {
        let config = MatchConfig::default();
        let candidates = vec![
            Candidate { value: "മല", key: "mala", score: 0.5 },
            Candidate { value: "മല", key: "malla", score: 0.88 },
            Candidate { value: "മല", key: "mal", score: 0.6 },
        ];
        let calibrated = calibrate(&candidates, "xyz", "xyz", &config);
        assert_eq!(calibrated.len(), 1);
        assert_eq!(calibrated[0].score, 0.88);
    }

    #[test]
    fn test_include_phonetic() {
        let idx = index(&["മല"]);
        let config = MatchConfig {
            include_phonetic: true,
            ..MatchConfig::default()
        };
        let results = suggest_in(&idx, "mal", 5, &config);
        assert_eq!(results[0].phonetic.as_deref(), Some("mala"));

        let json = serde_json::to_value(&suggest_in(&idx, "mal", 5, &MatchConfig::default())[0]).unwrap();
        assert_eq!(json, serde_json::json!({"value": "മല", "score": 1.0}));
    }

    #[test]
    fn test_rank_orders_and_rounds() {
        let ranked = rank(
            vec![
                Suggestion::new("b".to_string(), 0.7),
                Suggestion::new("a".to_string(), 0.7),
                Suggestion::new("c".to_string(), 0.123456),
                Suggestion::new("d".to_string(), 1.0),
            ],
            3,
        );
        let values: Vec<&str> = ranked.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["d", "a", "b"]);

        let rounded = rank(vec![Suggestion::new("c".to_string(), 0.123456)], 1);
        assert_eq!(rounded[0].score, 0.1235);
    }

    #[test]
    fn test_empty_inputs() {
        let config = MatchConfig::default();
        assert!(suggest_in(&index(&["മല"]), "", 25, &config).is_empty());
        assert!(suggest_in(&index(&["മല"]), "മല", 25, &config).is_empty());
        assert!(suggest_in(&index(&[]), "mala", 25, &config).is_empty());
        assert!(suggest_in(&index(&["മല"]), "mala", 0, &config).is_empty());
    }

    #[test]
    fn test_engine_suggest() {
        let engine = engine();
        let results = engine.suggest("mal", "name", 25).unwrap();
        let scored: Vec<(&str, f64)> = results.iter().map(|s| (s.value.as_str(), s.score)).collect();
        // "maala" is neither prefix nor substring: similarity 0.6 * 0.9
        assert_eq!(scored, vec![("മല", 1.0), ("മാല", 0.54)]);

        let results = engine.suggest("maal", "name", 25).unwrap();
        assert_eq!(results[0].value, "മാല");

        assert!(matches!(engine.suggest("mal", "voter_id", 25), Err(Error::UnknownColumn(_))));
    }

    #[test]
    fn test_engine_search_dispatch() {
        let engine = engine();

        let numeric = engine.search("12", "house_no", 25).unwrap();
        assert_eq!(numeric[0], Suggestion::new("12".to_string(), 1.0));
        assert_eq!(numeric.len(), 3);

        let houses = engine.search(" rose ", "house_name", 25).unwrap();
        assert_eq!(houses[0].value, "Rose Villa");

        assert!(engine.search("   ", "name", 25).unwrap().is_empty());
        assert!(matches!(engine.search("mal", "booth", 25), Err(Error::UnknownColumn(_))));
        assert!(matches!(engine.search("", "booth", 25), Err(Error::UnknownColumn(_))));
    }

    #[test]
    fn test_engine_values() {
        let engine = engine();
        assert_eq!(engine.values("name", 2).unwrap(), vec!["മല".to_string(), "മാല".to_string()]);
        assert_eq!(engine.values("house_no", 10).unwrap(), vec!["112", "12", "12A"]);
        assert!(engine.values("guardian", 10).is_err());
    }

    proptest! {
        #[test]
        fn prop_results_bounded_and_sorted(query in "[a-z]{1,6}", limit in 0usize..6) {
            let idx = index(&["മല", "മാല", "ഷാജി", "അമല", "വീട്", "ത", "ഠ", "Rose"]);
            let results = suggest_in(&idx, &query, limit, &MatchConfig::default());
            prop_assert!(results.len() <= limit);
            for pair in results.windows(2) {
                prop_assert!(
                    pair[0].score > pair[1].score
                        || (pair[0].score == pair[1].score && pair[0].value < pair[1].value)
                );
            }
        }

        #[test]
        fn prop_exact_key_query_finds_value(pick in 0usize..5) {
            let corpus = ["മല", "മാല", "ഷാജി", "അമല", "വീട്"];
            let idx = index(&corpus);
            let key = crate::glyph_mapper::normalize(corpus[pick]);
            let results = suggest_in(&idx, &key, 25, &MatchConfig::default());
            let hit = results.iter().find(|s| s.value == corpus[pick]);
            prop_assert!(hit.map_or(false, |s| s.score >= 0.995));
        }
    }
}
