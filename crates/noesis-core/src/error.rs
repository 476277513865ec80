//! Error types for Noesis.

use thiserror::Error;

use crate::types::SemanticType;

/// Main error type for Noesis operations.
///
/// Failing to find a proof or a plan is never an error: those outcomes are
/// represented by an empty [`ProofBases`](crate::ProofBases).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoesisError {
    /// An argument of the wrong type was placed into a slot.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: SemanticType,
        found: SemanticType,
    },

    /// More arguments were supplied than the expression has open slots.
    #[error("Arity error: {expression} has {open_slots} open slot(s), {supplied} argument(s) supplied")]
    Arity {
        expression: String,
        open_slots: usize,
        supplied: usize,
    },

    /// A sentence (truth-value expression) was required.
    #[error("Not a sentence: {expression} has type {found}")]
    NotASentence {
        expression: String,
        found: SemanticType,
    },

    /// A functional type was declared without inputs.
    #[error("Functional types need at least one input")]
    EmptyFunctionalType,

    /// The mental store was initialized twice.
    #[error("Mental store is already initialized")]
    AlreadyInitialized,

    /// A search was resumed after it had already delivered its result.
    #[error("Search already completed")]
    SearchComplete,

    /// A word is missing from the lexicon.
    #[error("Unknown word: {0}")]
    UnknownWord(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NoesisError {
    /// Returns true if the error stems from a caller supplying ill-formed input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            NoesisError::TypeMismatch { .. }
                | NoesisError::Arity { .. }
                | NoesisError::NotASentence { .. }
                | NoesisError::EmptyFunctionalType
                | NoesisError::AlreadyInitialized
                | NoesisError::SearchComplete
                | NoesisError::UnknownWord(_)
        )
    }
}

/// Convenience Result type for Noesis operations.
pub type Result<T> = std::result::Result<T, NoesisError>;

impl From<serde_json::Error> for NoesisError {
    fn from(err: serde_json::Error) -> Self {
        NoesisError::Serialization(err.to_string())
    }
}
