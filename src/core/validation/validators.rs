//! Whitelist predicates for enumerated vocabulary fields
//!
//! All of these are pure and never fail: they answer `true` only when the
//! candidate belongs to its fixed set.

use crate::core::vocabulary::{GrammaticalMarker, Language, Level, MarkerSet, WordType};
use std::collections::HashSet;

pub fn is_valid_language(value: &str) -> bool {
    Language::parse(value).is_some()
}

pub fn is_valid_word_type(value: &str) -> bool {
    WordType::parse(value).is_some()
}

/// Absent or empty markers are valid
pub fn is_valid_marker(value: Option<&str>, markers: MarkerSet) -> bool {
    match value {
        None | Some("") => true,
        Some(raw) => GrammaticalMarker::parse(raw).is_some_and(|m| markers.allows(m)),
    }
}

/// Every element must be a known level, without repeats. Empty is valid.
pub fn are_valid_levels<S: AsRef<str>>(levels: &[S]) -> bool {
    let mut seen = HashSet::with_capacity(levels.len());
    levels
        .iter()
        .all(|level| Level::parse(level.as_ref()).is_some_and(|parsed| seen.insert(parsed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // === is_valid_language() ===

    #[test]
    fn test_language_accepts_exact_codes() {
        for code in ["de", "fr", "jp"] {
            assert!(is_valid_language(code));
        }
    }

    #[test]
    fn test_language_rejects_variants() {
        for code in ["DE", "Fr", "", " fr", "en", "ja", "french"] {
            assert!(!is_valid_language(code), "{code:?}");
        }
    }

    // === is_valid_word_type() ===

    #[test]
    fn test_word_type_accepts_known() {
        for t in ["Noun", "Verb", "Adverb", "Adjective"] {
            assert!(is_valid_word_type(t));
        }
    }

    #[test]
    fn test_word_type_rejects_pronoun_and_case_variants() {
        assert!(!is_valid_word_type("Pronoun"));
        assert!(!is_valid_word_type("noun"));
        assert!(!is_valid_word_type(""));
    }

    // === is_valid_marker() ===

    #[test]
    fn test_marker_absent_or_empty_is_valid() {
        assert!(is_valid_marker(None, MarkerSet::Standard));
        assert!(is_valid_marker(Some(""), MarkerSet::Standard));
    }

    #[test]
    fn test_marker_standard_set() {
        assert!(is_valid_marker(Some("f"), MarkerSet::Standard));
        assert!(is_valid_marker(Some("m"), MarkerSet::Standard));
        assert!(is_valid_marker(Some("n"), MarkerSet::Standard));
        assert!(!is_valid_marker(Some("p"), MarkerSet::Standard));
        assert!(!is_valid_marker(Some("F"), MarkerSet::Standard));
        assert!(!is_valid_marker(Some("x"), MarkerSet::Standard));
    }

    #[test]
    fn test_marker_extended_set_allows_plural() {
        assert!(is_valid_marker(Some("p"), MarkerSet::Extended));
        assert!(!is_valid_marker(Some("q"), MarkerSet::Extended));
    }

    // === are_valid_levels() ===

    #[test]
    fn test_levels_empty_is_valid() {
        let empty: [&str; 0] = [];
        assert!(are_valid_levels(&empty));
    }

    #[test]
    fn test_levels_all_known() {
        assert!(are_valid_levels(&["Beginner", "Upper Intermediary", "Fluent"]));
    }

    #[test]
    fn test_levels_single_unknown_rejects_all() {
        assert!(!are_valid_levels(&["Beginner", "Expert"]));
        assert!(!are_valid_levels(&["beginner"]));
    }

    #[test]
    fn test_levels_duplicates_rejected() {
        assert!(!are_valid_levels(&["Beginner", "Beginner"]));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const LANGUAGES: &[&str] = &["de", "fr", "jp"];
        const LEVELS: &[&str] = &[
            "Beginner",
            "Upper Beginner",
            "Intermediary",
            "Upper Intermediary",
            "Advanced",
            "Fluent",
        ];

        fn language_candidate() -> impl Strategy<Value = String> {
            prop_oneof![
                prop::sample::select(LANGUAGES).prop_map(str::to_string),
                "[a-zA-Z]{0,3}",
                any::<String>(),
            ]
        }

        fn level_candidate() -> impl Strategy<Value = String> {
            prop_oneof![
                3 => prop::sample::select(LEVELS).prop_map(str::to_string),
                1 => "[A-Za-z ]{0,20}",
                1 => any::<String>(),
            ]
        }

        proptest! {
            #[test]
            fn language_valid_iff_whitelisted(code in language_candidate()) {
                prop_assert_eq!(is_valid_language(&code), LANGUAGES.contains(&code.as_str()));
            }

            #[test]
            fn levels_valid_iff_known_and_distinct(
                levels in prop::collection::vec(level_candidate(), 0..8)
            ) {
                let mut seen = HashSet::new();
                let expected = levels
                    .iter()
                    .all(|level| LEVELS.contains(&level.as_str()) && seen.insert(level.clone()));
                prop_assert_eq!(are_valid_levels(&levels), expected);
            }
        }
    }
}
