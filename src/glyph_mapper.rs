// src/glyph_mapper.rs
//
// Malayalam -> simplified Latin phonetic keys.
// The mapping is heuristic and lossy: several letters share a fragment
// (ത/ഠ -> "tha", ള/ല -> "la", ...) so that inconsistent romanisations typed
// by users still land on the same key.

/// Phonetic fragment for a single native-script character.
///
/// Returns `None` for characters outside the table; the caller decides how to
/// treat those (ASCII alphanumerics pass through, everything else is dropped).
/// The vowel sign 'െ' was listed twice in the source table, both times as
/// "e"; that last definition is the one kept here.
pub fn glyph_fragment(ch: char) -> Option<&'static str> {
    let fragment = match ch {
        // Independent vowels
        'അ' => "a",
        'ആ' => "aa",
        'ഇ' => "i",
        'ഈ' | 'ഏ' => "ee",
        'ഉ' => "u",
        'ഊ' | 'ഓ' => "oo",
        'എ' => "e",
        'ഐ' => "ai",
        'ഒ' => "o",
        'ഔ' => "au",

        // Consonants
        'ക' => "ka",
        'ഖ' => "kha",
        'ഗ' => "ga",
        'ഘ' => "gha",
        'ങ' => "nga",
        'ച' => "cha",
        'ഛ' => "chha",
        'ജ' => "ja",
        'ഝ' => "jha",
        'ഞ' => "nja",
        'ട' => "ta",
        'ഠ' | 'ത' => "tha",
        'ഡ' => "da",
        'ഢ' | 'ദ' => "dha",
        'ണ' | 'ന' => "na",
        'ഥ' => "thha",
        'ധ' => "dhha",
        'പ' => "pa",
        'ഫ' => "pha",
        'ബ' => "ba",
        'ഭ' => "bha",
        'മ' => "ma",
        'യ' => "ya",
        'ര' | 'റ' => "ra",
        'ല' | 'ള' => "la",
        'വ' => "va",
        'ശ' | 'ഷ' => "sha",
        'സ' => "sa",
        'ഹ' => "ha",
        'ഴ' => "zha",

        // Dependent vowel signs
        'ാ' => "a",
        'ി' => "i",
        'ീ' | 'േ' => "ee",
        'ു' => "u",
        'ൂ' | 'ോ' => "oo",
        'െ' => "e",
        'ൈ' => "ai",
        'ൊ' => "o",
        'ൗ' => "au",

        // Chillu letters: consonants carrying an implicit virama
        'ൺ' | 'ൻ' => "n",
        'ർ' => "r",
        'ൽ' | 'ൾ' => "l",
        'ൿ' => "k",

        // Special marks
        '്' => "", // virama only suppresses the inherent vowel
        'ം' => "m", // anusvara
        'ഃ' => "h", // visarga

        _ => return None,
    };
    Some(fragment)
}

/// Convert a native-script string into its phonetic key.
///
/// Total function: whitespace and unknown characters contribute nothing,
/// ASCII letters and digits pass through, and the result only ever contains
/// `[a-z0-9]` with no character repeated more than twice in a row.
pub fn normalize(raw: &str) -> String {
    let mut joined = String::with_capacity(raw.len() * 2);

    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            continue;
        }
        match glyph_fragment(ch) {
            Some(fragment) => joined.push_str(fragment),
            None if ch.is_ascii_alphanumeric() => joined.push(ch),
            None => {}
        }
    }

    let cleaned: String = joined
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    collapse_runs(&cleaned)
}

/// Shrink every run of 3+ identical characters down to exactly 2.
fn collapse_runs(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    let mut run_length = 0;

    for ch in text.chars() {
        if previous == Some(ch) {
            run_length += 1;
        } else {
            previous = Some(ch);
            run_length = 1;
        }
        if run_length <= 2 {
            result.push(ch);
        }
    }

    result
}
