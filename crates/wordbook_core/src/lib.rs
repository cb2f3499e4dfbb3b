//! Core domain logic for the Wordbook vocabulary dictionary.
//! This crate is the single source of truth for entry invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, WordbookConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::word::{
    PartOfSpeech, UnknownPartOfSpeech, Word, WordField, WordId, WordValidationError,
    LIST_SEPARATOR,
};
pub use repo::local_source::{SqliteWordDataSource, WordLocalDataSource};
pub use repo::word_mapper::{to_database_model, to_domain_model, MapperError, WordEntity};
pub use repo::word_repo::{
    LocalWordRepository, RepoError, RepoResult, SqliteWordRepository, WordFilter, WordRepository,
    WordSort,
};
pub use service::flashcard_service::{Deck, DeckOptions, Flashcard, FlashcardService};
pub use service::word_service::{NewWord, WordPage, WordPatch, WordService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
