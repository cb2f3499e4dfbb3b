//! Dictionary use-case service.
//!
//! # Responsibility
//! - Normalize user input before it reaches the repository.
//! - Apply browse defaults (page size) on top of repository listing.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Listing never returns more than `BROWSE_LIMIT_MAX` rows per call.

use crate::model::word::{PartOfSpeech, Word, WordId};
use crate::repo::word_repo::{RepoError, RepoResult, WordFilter, WordRepository};
use once_cell::sync::Lazy;
use regex::Regex;

pub const BROWSE_DEFAULT_LIMIT: u32 = 50;
pub const BROWSE_LIMIT_MAX: u32 = 500;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Input for creating a dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWord {
    pub text: String,
    pub translations: Vec<String>,
    pub examples: Vec<String>,
    pub part_of_speech: PartOfSpeech,
    pub notes: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordPatch {
    pub text: Option<String>,
    pub translations: Option<Vec<String>>,
    pub examples: Option<Vec<String>>,
    pub part_of_speech: Option<PartOfSpeech>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

/// One page of browse results plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPage {
    pub words: Vec<Word>,
    pub total: u64,
    pub applied_limit: u32,
}

/// Use-case service wrapper for dictionary operations.
pub struct WordService<R: WordRepository> {
    repo: R,
}

impl<R: WordRepository> WordService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a word from user input and returns the stored entry.
    pub fn add_word(&self, input: NewWord) -> RepoResult<Word> {
        let mut word = Word::new(
            normalize_headword(&input.text),
            normalize_items(input.translations),
        );
        word.examples = normalize_items(input.examples);
        word.part_of_speech = input.part_of_speech;
        word.notes = normalize_notes(input.notes);

        self.repo.add_word(&word)?;
        Ok(word)
    }

    /// Applies a partial update to an existing word.
    pub fn edit_word(&self, id: WordId, patch: WordPatch) -> RepoResult<Word> {
        let mut word = self.repo.get_word(id)?.ok_or(RepoError::NotFound(id))?;

        if let Some(text) = patch.text {
            word.text = normalize_headword(&text);
        }
        if let Some(translations) = patch.translations {
            word.translations = normalize_items(translations);
        }
        if let Some(examples) = patch.examples {
            word.examples = normalize_items(examples);
        }
        if let Some(part_of_speech) = patch.part_of_speech {
            word.part_of_speech = part_of_speech;
        }
        if let Some(notes) = patch.notes {
            word.notes = normalize_notes(notes);
        }

        self.repo.update_word(&word)
    }

    pub fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        self.repo.get_word(id)
    }

    /// Lists one page of words matching `filter`.
    ///
    /// A blank query is treated as no query. The limit defaults to
    /// `BROWSE_DEFAULT_LIMIT` and is clamped to `BROWSE_LIMIT_MAX`.
    pub fn browse(&self, filter: &WordFilter) -> RepoResult<WordPage> {
        let applied_limit = normalize_limit(filter.limit);
        let effective = WordFilter {
            query: filter
                .query
                .as_deref()
                .map(str::trim)
                .filter(|query| !query.is_empty())
                .map(str::to_string),
            limit: Some(applied_limit),
            ..filter.clone()
        };

        let words = self.repo.list_words(&effective)?;
        let total = self.repo.count_words(&effective)?;
        Ok(WordPage {
            words,
            total,
            applied_limit,
        })
    }

    /// Number of stored words per part of speech, omitting empty categories.
    pub fn part_of_speech_counts(&self) -> RepoResult<Vec<(PartOfSpeech, u64)>> {
        self.repo.part_of_speech_counts()
    }

    pub fn delete_word(&self, id: WordId) -> RepoResult<()> {
        self.repo.delete_word(id)
    }
}

fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => BROWSE_DEFAULT_LIMIT,
        Some(value) => value.min(BROWSE_LIMIT_MAX),
    }
}

fn normalize_headword(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

fn normalize_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
