//! Flashcard deck building over the dictionary.
//!
//! # Invariants
//! - A deck holds each matching word at most once.
//! - Seeded decks are deterministic for the same stored words and seed.

use crate::model::word::{PartOfSpeech, Word, WordId};
use crate::repo::word_repo::{RepoResult, WordFilter, WordRepository};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Options for drawing a study deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckOptions {
    /// Which words are eligible. Sort and pagination are applied before
    /// shuffling, so `limit` caps the candidate pool.
    pub filter: WordFilter,
    /// Show translations on the front and the headword on the back.
    pub reversed: bool,
    /// Maximum cards in the deck after shuffling.
    pub size: Option<usize>,
}

/// One card as presented to the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub word_id: WordId,
    pub front: String,
    pub back: String,
    pub part_of_speech: PartOfSpeech,
    pub examples: Vec<String>,
}

impl Flashcard {
    fn from_word(word: Word, reversed: bool) -> Self {
        let translations = word.translations_display();
        let (front, back) = if reversed {
            (translations, word.text)
        } else {
            (word.text, translations)
        };
        Self {
            word_id: word.id,
            front,
            back,
            part_of_speech: word.part_of_speech,
            examples: word.examples,
        }
    }
}

/// Shuffled sequence of flashcards.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: std::vec::IntoIter<Flashcard>,
    total: usize,
}

impl Deck {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Iterator for Deck {
    type Item = Flashcard;

    fn next(&mut self) -> Option<Self::Item> {
        self.cards.next()
    }
}

pub struct FlashcardService<R: WordRepository> {
    repo: R,
}

impl<R: WordRepository> FlashcardService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds a deck shuffled with OS entropy.
    pub fn build_deck(&self, options: &DeckOptions) -> RepoResult<Deck> {
        self.build_with_rng(options, &mut StdRng::from_os_rng())
    }

    /// Builds a deck whose order depends only on `seed` and stored data.
    pub fn build_deck_seeded(&self, options: &DeckOptions, seed: u64) -> RepoResult<Deck> {
        self.build_with_rng(options, &mut StdRng::seed_from_u64(seed))
    }

    fn build_with_rng(&self, options: &DeckOptions, rng: &mut StdRng) -> RepoResult<Deck> {
        let mut words = self.repo.list_words(&options.filter)?;
        words.shuffle(rng);
        if let Some(size) = options.size {
            words.truncate(size);
        }

        let cards = words
            .into_iter()
            .map(|word| Flashcard::from_word(word, options.reversed))
            .collect::<Vec<_>>();
        let total = cards.len();
        info!(
            "event=deck_build module=flashcards status=ok cards={total} reversed={}",
            options.reversed
        );

        Ok(Deck {
            cards: cards.into_iter(),
            total,
        })
    }
}
