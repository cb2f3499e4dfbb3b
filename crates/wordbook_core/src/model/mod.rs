//! Domain model for dictionary entries.
//!
//! # Invariants
//! - Every word is identified by a stable `WordId`.
//! - List-valued fields never contain the storage separator once validated.

pub mod word;
