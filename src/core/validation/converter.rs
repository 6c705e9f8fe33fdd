//! Record conversion: untrusted input to a storage-ready entry
//!
//! Every write path (single create, update, bulk import) goes through
//! [`RecordConverter::to_record`]. The enumerated fields are whitelisted,
//! length rules are applied and free text is sanitized. Conversion either
//! yields a complete [`NewVocabulary`] or the first failure; nothing is
//! persisted here.

use serde_json::{Map, Value};
use validator::Validate;

use super::sanitizer::{sanitize, sanitize_all};
use super::validators::{are_valid_levels, is_valid_language, is_valid_marker, is_valid_word_type};
use crate::core::error::ValidationError;
use crate::core::vocabulary::{
    GrammaticalMarker, Language, Level, MarkerSet, NewVocabulary, RawRecord, VocabularyPayload,
    WordType,
};

/// Converts raw records into validated entries
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordConverter {
    markers: MarkerSet,
}

impl RecordConverter {
    pub fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }

    /// Validate and sanitize either call shape
    pub fn to_record(&self, input: impl Into<RawRecord>) -> Result<NewVocabulary, ValidationError> {
        match input.into() {
            RawRecord::Typed(payload) => self.convert_payload(payload),
            RawRecord::Untyped(map) => self.convert_map(&map),
        }
    }

    /// Read a loosely structured record field by field, then convert it
    pub fn convert_map(&self, map: &Map<String, Value>) -> Result<NewVocabulary, ValidationError> {
        let payload = VocabularyPayload {
            word: required_string(map, "word")?,
            english_translation: required_string(map, "english_translation")?,
            definition: string_list(map, "definition")?,
            examples: string_list(map, "examples")?,
            language: required_string(map, "language")?,
            word_type: required_string(map, "word_type")?,
            article: match optional_string(map, "article")? {
                Some(article) => Some(article),
                None => optional_string(map, "gender")?,
            },
            levels: string_list(map, "levels")?,
        };
        self.convert_payload(payload)
    }

    pub fn convert_payload(
        &self,
        payload: VocabularyPayload,
    ) -> Result<NewVocabulary, ValidationError> {
        let levels = payload.levels.clone().unwrap_or_default();

        let checks = [
            ("word_type", is_valid_word_type(&payload.word_type)),
            ("language", is_valid_language(&payload.language)),
            ("levels", are_valid_levels(&levels)),
            (
                "article",
                is_valid_marker(payload.article.as_deref(), self.markers),
            ),
        ];
        if let Some((field, _)) = checks.iter().find(|(_, ok)| !ok) {
            return Err(ValidationError::field(field, "value is not allowed"));
        }

        if let Err(errors) = payload.validate() {
            let field_errors = errors.field_errors();
            let field = field_errors
                .keys()
                .min()
                .map(|name| name.to_string())
                .unwrap_or_else(|| "payload".to_string());
            return Err(ValidationError::field(&field, "length out of range"));
        }

        let word = sanitize(&payload.word);
        if word.is_empty() {
            return Err(ValidationError::field("word", "is required"));
        }
        let english_translation = sanitize(&payload.english_translation);
        if english_translation.is_empty() {
            return Err(ValidationError::field("english_translation", "is required"));
        }

        Ok(NewVocabulary {
            word,
            english_translation,
            definition: sanitize_all(payload.definition),
            examples: sanitize_all(payload.examples),
            language: parsed(Language::parse(&payload.language), "language")?,
            word_type: parsed(WordType::parse(&payload.word_type), "word_type")?,
            article: match payload.article.as_deref() {
                None | Some("") => None,
                Some(raw) => Some(parsed(GrammaticalMarker::parse(raw), "article")?),
            },
            levels: levels
                .iter()
                .map(|level| parsed(Level::parse(level), "levels"))
                .collect::<Result<_, _>>()?,
        })
    }
}

fn parsed<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::field(field, "value is not allowed"))
}

fn optional_string(map: &Map<String, Value>, field: &str) -> Result<Option<String>, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::field(field, "must be a string")),
    }
}

fn required_string(map: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    optional_string(map, field)?.ok_or_else(|| ValidationError::field(field, "is required"))
}

fn string_list(map: &Map<String, Value>, field: &str) -> Result<Option<Vec<String>>, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::field(field, "must be a list of strings"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(ValidationError::field(field, "must be a list of strings")),
    }
}
