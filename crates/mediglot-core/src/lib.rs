//! Term matching and suggestion engine.
//!
//! Given free text and a [`MedicalVocabulary`], surface close lexical matches
//! for words that are not found verbatim in the vocabulary — flagging likely
//! transcription or spelling issues in clinical text before translation.
//!
//! The engine is pure and stateless: it only reads the immutable vocabulary,
//! so it is safe to call concurrently from any number of request handlers.

mod engine;
mod matcher;
mod token;

pub use engine::{suggest, suggest_detailed, suggest_with_config};
pub use matcher::{match_token, similarity, MatchConfig, Suggestion};
pub use token::{normalize_token, tokenize};

pub use mediglot_vocab::MedicalVocabulary;
