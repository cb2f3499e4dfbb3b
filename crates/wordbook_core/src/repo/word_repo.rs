//! Word repository contracts and local-store implementation.
//!
//! # Responsibility
//! - Provide domain-level CRUD over the dictionary.
//! - Apply [`Word::validate`] on writes and the row mapper on both directions.
//!
//! # Invariants
//! - Write paths validate before touching storage, so no persisted list item
//!   contains the list separator.
//! - Read paths reject rows that cannot be mapped instead of masking them.

use crate::db::DbError;
use crate::model::word::{now_epoch_ms, PartOfSpeech, Word, WordId, WordValidationError};
use crate::repo::local_source::{SqliteWordDataSource, WordLocalDataSource};
use crate::repo::word_mapper::{to_database_model, to_domain_model, MapperError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for word persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(WordValidationError),
    Mapping(MapperError),
    Db(DbError),
    NotFound(WordId),
    AlreadyExists(WordId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "invalid persisted word data: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "word not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "word already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "word repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "word repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "word repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Mapping(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::AlreadyExists(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<WordValidationError> for RepoError {
    fn from(value: WordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MapperError> for RepoError {
    fn from(value: MapperError) -> Self {
        Self::Mapping(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordering applied to word listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordSort {
    /// Headword, case-insensitive, ties broken by id.
    #[default]
    Alphabetical,
    /// Most recently created first.
    Newest,
}

/// Browse/filter options for listing words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFilter {
    /// Substring matched against text, translations and notes.
    /// Case-insensitive for ASCII letters.
    pub query: Option<String>,
    pub part_of_speech: Option<PartOfSpeech>,
    pub sort: WordSort,
    /// `None` returns every matching row.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for dictionary CRUD operations.
pub trait WordRepository {
    fn add_word(&self, word: &Word) -> RepoResult<WordId>;
    /// Persists new field values and returns the word as re-read from
    /// storage. `created_at` is never changed; `updated_at` is refreshed.
    fn update_word(&self, word: &Word) -> RepoResult<Word>;
    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>>;
    fn list_words(&self, filter: &WordFilter) -> RepoResult<Vec<Word>>;
    fn count_words(&self, filter: &WordFilter) -> RepoResult<u64>;
    fn part_of_speech_counts(&self) -> RepoResult<Vec<(PartOfSpeech, u64)>>;
    fn delete_word(&self, id: WordId) -> RepoResult<()>;
}

/// Repository backed by a local row-level data source.
pub struct LocalWordRepository<S: WordLocalDataSource> {
    source: S,
}

impl<S: WordLocalDataSource> LocalWordRepository<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

/// Repository over a migrated SQLite connection.
pub type SqliteWordRepository<'conn> = LocalWordRepository<SqliteWordDataSource<'conn>>;

impl<'conn> LocalWordRepository<SqliteWordDataSource<'conn>> {
    /// Checks the connection schema and wraps it in a repository.
    pub fn try_from_connection(conn: &'conn rusqlite::Connection) -> RepoResult<Self> {
        Ok(Self::new(SqliteWordDataSource::try_new(conn)?))
    }
}

impl<S: WordLocalDataSource> WordRepository for LocalWordRepository<S> {
    fn add_word(&self, word: &Word) -> RepoResult<WordId> {
        word.validate()?;

        if !self.source.insert(&to_database_model(word))? {
            return Err(RepoError::AlreadyExists(word.id));
        }

        debug!("event=word_add module=repo status=ok word_id={}", word.id);
        Ok(word.id)
    }

    fn update_word(&self, word: &Word) -> RepoResult<Word> {
        // `created_at` is owned by the stored row; the caller's copy is ignored.
        let now = now_epoch_ms();
        let mut candidate = word.clone();
        candidate.created_at = candidate.created_at.min(now);
        candidate.updated_at = now;
        candidate.validate()?;

        if !self.source.update(&to_database_model(&candidate))? {
            return Err(RepoError::NotFound(word.id));
        }

        let stored = self
            .get_word(word.id)?
            .ok_or(RepoError::NotFound(word.id))?;
        debug!("event=word_update module=repo status=ok word_id={}", word.id);
        Ok(stored)
    }

    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        match self.source.get(&id.to_string())? {
            Some(entity) => Ok(Some(to_domain_model(entity)?)),
            None => Ok(None),
        }
    }

    fn list_words(&self, filter: &WordFilter) -> RepoResult<Vec<Word>> {
        self.source
            .list(filter)?
            .into_iter()
            .map(|entity| to_domain_model(entity).map_err(RepoError::from))
            .collect()
    }

    fn count_words(&self, filter: &WordFilter) -> RepoResult<u64> {
        self.source.count(filter)
    }

    fn part_of_speech_counts(&self) -> RepoResult<Vec<(PartOfSpeech, u64)>> {
        self.source
            .part_of_speech_counts()?
            .into_iter()
            .map(|(token, count)| {
                token
                    .parse::<PartOfSpeech>()
                    .map(|part_of_speech| (part_of_speech, count))
                    .map_err(|_| RepoError::Mapping(MapperError::InvalidPartOfSpeech(token)))
            })
            .collect()
    }

    fn delete_word(&self, id: WordId) -> RepoResult<()> {
        if !self.source.delete(&id.to_string())? {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=word_delete module=repo status=ok word_id={id}");
        Ok(())
    }
}
