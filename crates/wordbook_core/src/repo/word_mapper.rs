//! Conversion between [`Word`] and its flat `words` row.
//!
//! # Invariants
//! - List fields are joined with [`LIST_SEPARATOR`] and split back on read.
//! - Empty examples are stored as `NULL`, so `Some("")` stays free to mean
//!   `[""]` and every examples list round-trips.
//! - Empty translations are stored as `''`, which reads back as `[]`; the
//!   one-item list `[""]` therefore also reads back as `[]`.
//! - For every word whose items do not contain the separator, and whose
//!   translations are not `[""]`, `to_domain_model(to_database_model(w)) == w`.

use crate::model::word::{PartOfSpeech, Word, LIST_SEPARATOR};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Flattened row representation of a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntity {
    pub id: String,
    pub text: String,
    pub translations: String,
    pub examples: Option<String>,
    pub part_of_speech: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Row content that cannot be turned back into a domain word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
    InvalidId(String),
    InvalidPartOfSpeech(String),
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid uuid value `{value}` in words.id"),
            Self::InvalidPartOfSpeech(value) => {
                write!(f, "invalid part of speech `{value}` in words.part_of_speech")
            }
        }
    }
}

impl Error for MapperError {}

/// Flattens a domain word into its row form.
pub fn to_database_model(word: &Word) -> WordEntity {
    WordEntity {
        id: word.id.to_string(),
        text: word.text.clone(),
        translations: join_list(&word.translations),
        examples: if word.examples.is_empty() {
            None
        } else {
            Some(join_list(&word.examples))
        },
        part_of_speech: word.part_of_speech.as_str().to_string(),
        notes: word.notes.clone(),
        created_at: word.created_at,
        updated_at: word.updated_at,
    }
}

/// Rebuilds a domain word from its row form.
pub fn to_domain_model(entity: WordEntity) -> Result<Word, MapperError> {
    let id = Uuid::parse_str(&entity.id).map_err(|_| MapperError::InvalidId(entity.id.clone()))?;
    let part_of_speech = entity
        .part_of_speech
        .parse::<PartOfSpeech>()
        .map_err(|_| MapperError::InvalidPartOfSpeech(entity.part_of_speech.clone()))?;

    Ok(Word {
        id,
        text: entity.text,
        translations: if entity.translations.is_empty() {
            Vec::new()
        } else {
            split_list(&entity.translations)
        },
        examples: entity
            .examples
            .as_deref()
            .map(split_list)
            .unwrap_or_default(),
        part_of_speech,
        notes: entity.notes,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    })
}

fn join_list(items: &[String]) -> String {
    items.join(LIST_SEPARATOR.to_string().as_str())
}

fn split_list(encoded: &str) -> Vec<String> {
    encoded.split(LIST_SEPARATOR).map(str::to_string).collect()
}
