//! Word domain model.
//!
//! # Responsibility
//! - Define the canonical dictionary entry used by services and repositories.
//! - Own write-time validation rules for entries.
//!
//! # Invariants
//! - `id` is stable and never reused for another word.
//! - `translations` holds at least one non-blank item.
//! - No translation or example contains [`LIST_SEPARATOR`].
//! - `updated_at` is never earlier than `created_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Separator used to flatten list fields into one text column.
///
/// The encoding has no escaping, so an item containing this character would
/// split into several items on read. An empty translations list and the
/// list `[""]` share the encoding `''` and both read back as empty.
/// [`Word::validate`] rejects both cases.
pub const LIST_SEPARATOR: char = '¶';

/// Stable identifier for every dictionary entry.
pub type WordId = Uuid;

/// Grammatical category attached to a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    /// Multi-word expression or idiom.
    Phrase,
    #[default]
    Other,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 10] = [
        Self::Noun,
        Self::Verb,
        Self::Adjective,
        Self::Adverb,
        Self::Pronoun,
        Self::Preposition,
        Self::Conjunction,
        Self::Interjection,
        Self::Phrase,
        Self::Other,
    ];

    /// Storage token, also used for display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Pronoun => "pronoun",
            Self::Preposition => "preposition",
            Self::Conjunction => "conjunction",
            Self::Interjection => "interjection",
            Self::Phrase => "phrase",
            Self::Other => "other",
        }
    }
}

impl Display for PartOfSpeech {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a part-of-speech token is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPartOfSpeech(pub String);

impl Display for UnknownPartOfSpeech {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown part of speech `{}`", self.0)
    }
}

impl Error for UnknownPartOfSpeech {}

impl FromStr for PartOfSpeech {
    type Err = UnknownPartOfSpeech;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "noun" | "n" => Ok(Self::Noun),
            "verb" | "v" => Ok(Self::Verb),
            "adjective" | "adj" => Ok(Self::Adjective),
            "adverb" | "adv" => Ok(Self::Adverb),
            "pronoun" | "pron" => Ok(Self::Pronoun),
            "preposition" | "prep" => Ok(Self::Preposition),
            "conjunction" | "conj" => Ok(Self::Conjunction),
            "interjection" | "interj" => Ok(Self::Interjection),
            "phrase" => Ok(Self::Phrase),
            "other" => Ok(Self::Other),
            _ => Err(UnknownPartOfSpeech(value.to_string())),
        }
    }
}

/// List-valued field of a [`Word`], used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordField {
    Translations,
    Examples,
}

impl Display for WordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Translations => f.write_str("translations"),
            Self::Examples => f.write_str("examples"),
        }
    }
}

/// Validation failures for write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordValidationError {
    EmptyText,
    MissingTranslation,
    EmptyListItem { field: WordField, index: usize },
    ContainsSeparator { field: WordField, index: usize },
    InvalidTimestamps { created_at: i64, updated_at: i64 },
}

impl Display for WordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "word text must not be blank"),
            Self::MissingTranslation => write!(f, "word needs at least one translation"),
            Self::EmptyListItem { field, index } => {
                write!(f, "{field}[{index}] must not be blank")
            }
            Self::ContainsSeparator { field, index } => write!(
                f,
                "{field}[{index}] contains reserved separator `{LIST_SEPARATOR}`"
            ),
            Self::InvalidTimestamps {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for WordValidationError {}

/// Canonical dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    /// Headword as the learner sees it on the card front.
    pub text: String,
    pub translations: Vec<String>,
    pub examples: Vec<String>,
    pub part_of_speech: PartOfSpeech,
    pub notes: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Word {
    /// Creates a word with a generated stable ID and current timestamps.
    pub fn new(text: impl Into<String>, translations: Vec<String>) -> Self {
        Self::with_id(Uuid::new_v4(), text, translations)
    }

    /// Creates a word with a caller-provided ID, used by import paths.
    ///
    /// Does not validate; call [`Word::validate`] before persisting.
    pub fn with_id(id: WordId, text: impl Into<String>, translations: Vec<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            text: text.into(),
            translations,
            examples: Vec::new(),
            part_of_speech: PartOfSpeech::default(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks all write-time invariants.
    pub fn validate(&self) -> Result<(), WordValidationError> {
        if self.text.trim().is_empty() {
            return Err(WordValidationError::EmptyText);
        }
        if self.translations.is_empty() {
            return Err(WordValidationError::MissingTranslation);
        }
        validate_list(WordField::Translations, &self.translations)?;
        validate_list(WordField::Examples, &self.examples)?;
        if self.updated_at < self.created_at {
            return Err(WordValidationError::InvalidTimestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Translations joined for display, e.g. on a card back.
    pub fn translations_display(&self) -> String {
        self.translations.join(", ")
    }
}

fn validate_list(field: WordField, items: &[String]) -> Result<(), WordValidationError> {
    for (index, item) in items.iter().enumerate() {
        if item.trim().is_empty() {
            return Err(WordValidationError::EmptyListItem { field, index });
        }
        if item.contains(LIST_SEPARATOR) {
            return Err(WordValidationError::ContainsSeparator { field, index });
        }
    }
    Ok(())
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
