// src/similarity.rs
//
// Edit distance and normalized similarity over phonetic keys.

/// Classic Levenshtein distance with unit costs.
///
/// Counts characters, not bytes, so it stays correct for non-ASCII input even
/// though phonetic keys are plain ASCII.
pub fn edit_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    if chars_a.is_empty() {
        return chars_b.len();
    }
    if chars_b.is_empty() {
        return chars_a.len();
    }

    // Two rolling rows instead of the full matrix
    let mut previous: Vec<usize> = (0..=chars_b.len()).collect();
    let mut current = vec![0; chars_b.len() + 1];

    for (i, &ca) in chars_a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in chars_b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            current[j + 1] = std::cmp::min(
                std::cmp::min(
                    previous[j + 1] + 1, // deletion
                    current[j] + 1,      // insertion
                ),
                previous[j] + cost, // substitution
            );
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[chars_b.len()]
}

/// Normalized closeness in [0.0, 1.0], where 1.0 means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();

    match (len_a, len_b) {
        (0, 0) => 1.0,
        (0, _) | (_, 0) => 0.0,
        _ => {
            let max_len = len_a.max(len_b) as f64;
            (1.0 - edit_distance(a, b) as f64 / max_len).max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("amla", "mala"), 2);
        assert_eq!(edit_distance("mal", "mala"), 1);
        assert_eq!(edit_distance("shaji", "shaajai"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_edit_distance_counts_chars() {
        assert_eq!(edit_distance("മല", "മാല"), 1);
        assert_eq!(edit_distance("vindstød", "vindstod"), 1);
    }

    #[test]
    fn test_similarity_edges() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "x"), 0.0);
        assert_eq!(similarity("x", ""), 0.0);
        assert_eq!(similarity("mala", "mala"), 1.0);
    }

    #[test]
    fn test_similarity_values() {
        assert!((similarity("amla", "mala") - 0.5).abs() < 1e-9);
        assert!((similarity("mal", "mala") - 0.75).abs() < 1e-9);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        // Lengths differ: distance 3 over max length 3
        assert_eq!(similarity("a", "bcd"), 0.0);
    }

    proptest! {
        #[test]
        fn prop_similarity_reflexive(a in "[a-z0-9]{0,16}") {
            prop_assert_eq!(similarity(&a, &a), 1.0);
            prop_assert_eq!(edit_distance(&a, &a), 0);
        }

        #[test]
        fn prop_edit_distance_symmetric(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
            prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
        }

        #[test]
        fn prop_triangle_inequality(a in "[a-e]{0,8}", b in "[a-e]{0,8}", c in "[a-e]{0,8}") {
            prop_assert!(edit_distance(&a, &c) <= edit_distance(&a, &b) + edit_distance(&b, &c));
        }

        #[test]
        fn prop_similarity_in_unit_range(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
            let score = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
