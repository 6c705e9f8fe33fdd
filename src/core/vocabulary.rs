//! Vocabulary entities and their enumerated metadata
//!
//! Enumerated fields arrive as raw strings from the transport layer and are
//! only turned into these types by the record converter, after validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Generates a closed string enum with `parse` and `as_str`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Exact, case-sensitive lookup of the wire spelling
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Wire spelling of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Languages the vocabulary can be recorded for
    Language {
        De => "de",
        Fr => "fr",
        Jp => "jp",
    }
);

wire_enum!(
    /// Part of speech
    WordType {
        Noun => "Noun",
        Verb => "Verb",
        Adverb => "Adverb",
        Adjective => "Adjective",
    }
);

wire_enum!(
    /// Grammatical article/gender marker.
    ///
    /// `Plural` only exists in the extended marker set, see [`MarkerSet`].
    GrammaticalMarker {
        Feminine => "f",
        Masculine => "m",
        Neuter => "n",
        Plural => "p",
    }
);

wire_enum!(
    /// Proficiency levels an entry is tagged with
    Level {
        Beginner => "Beginner",
        UpperBeginner => "Upper Beginner",
        Intermediary => "Intermediary",
        UpperIntermediary => "Upper Intermediary",
        Advanced => "Advanced",
        Fluent => "Fluent",
    }
);

/// Which grammatical markers a deployment accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSet {
    /// `f`, `m`, `n`
    #[default]
    Standard,
    /// `f`, `m`, `n`, `p`
    Extended,
}

impl MarkerSet {
    pub fn allows(&self, marker: GrammaticalMarker) -> bool {
        match self {
            MarkerSet::Standard => marker != GrammaticalMarker::Plural,
            MarkerSet::Extended => true,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(MarkerSet::Standard),
            "extended" => Some(MarkerSet::Extended),
            _ => None,
        }
    }
}

/// Strictly-typed payload submitted by API clients.
///
/// Enumerated fields stay as strings here so that a bad value is reported
/// as a validation failure rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VocabularyPayload {
    #[validate(length(min = 1, max = 250))]
    pub word: String,

    #[validate(length(min = 1, max = 500))]
    pub english_translation: String,

    #[serde(default)]
    #[validate(length(max = 50), custom(function = "text_items_within_limit"))]
    pub definition: Option<Vec<String>>,

    #[serde(default)]
    #[validate(length(max = 50), custom(function = "text_items_within_limit"))]
    pub examples: Option<Vec<String>>,

    pub language: String,

    pub word_type: String,

    /// Legacy payloads call this field `gender`
    #[serde(default, alias = "gender")]
    pub article: Option<String>,

    #[serde(default)]
    pub levels: Option<Vec<String>>,
}

/// Longest accepted definition or example, in characters
pub const MAX_TEXT_ITEM_LEN: usize = 1000;

fn text_items_within_limit(items: &[String]) -> Result<(), validator::ValidationError> {
    if items.iter().any(|item| item.chars().count() > MAX_TEXT_ITEM_LEN) {
        return Err(validator::ValidationError::new("length"));
    }
    Ok(())
}

/// Untrusted input for the record converter.
///
/// Bulk imports hand over loosely structured JSON objects while the API
/// hands over typed payloads; both go through the same checks.
#[derive(Debug, Clone)]
pub enum RawRecord {
    Typed(VocabularyPayload),
    Untyped(Map<String, Value>),
}

impl From<VocabularyPayload> for RawRecord {
    fn from(payload: VocabularyPayload) -> Self {
        RawRecord::Typed(payload)
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        RawRecord::Untyped(map)
    }
}

/// A validated, sanitized entry that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVocabulary {
    pub word: String,
    pub english_translation: String,
    pub definition: Option<Vec<String>>,
    pub examples: Option<Vec<String>>,
    pub language: Language,
    pub word_type: WordType,
    pub article: Option<GrammaticalMarker>,
    pub levels: Vec<Level>,
}

/// A stored vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub vocab_id: i64,
    pub word: String,
    pub english_translation: String,
    pub definition: Option<Vec<String>>,
    pub examples: Option<Vec<String>>,
    pub language: Language,
    pub word_type: WordType,
    pub article: Option<GrammaticalMarker>,
    pub levels: Vec<Level>,
}

impl VocabularyEntry {
    /// Attach a store-assigned id
    pub fn from_new(vocab_id: i64, entry: NewVocabulary) -> Self {
        Self {
            vocab_id,
            word: entry.word,
            english_translation: entry.english_translation,
            definition: entry.definition,
            examples: entry.examples,
            language: entry.language,
            word_type: entry.word_type,
            article: entry.article,
            levels: entry.levels,
        }
    }

    /// Replace every mutable field, keeping the id
    pub fn replace_with(&mut self, entry: NewVocabulary) {
        *self = Self::from_new(self.vocab_id, entry);
    }
}

/// Flat row written by the export endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub vocab_id: i64,
    pub word: String,
    pub english_translation: String,
    pub word_type: WordType,
    pub definition: Option<Vec<String>>,
    pub examples: Option<Vec<String>>,
    pub article: Option<GrammaticalMarker>,
    pub levels: Vec<Level>,
}

impl From<VocabularyEntry> for ExportRow {
    fn from(entry: VocabularyEntry) -> Self {
        Self {
            vocab_id: entry.vocab_id,
            word: entry.word,
            english_translation: entry.english_translation,
            word_type: entry.word_type,
            definition: entry.definition,
            examples: entry.examples,
            article: entry.article,
            levels: entry.levels,
        }
    }
}
