//! # Noesis Core
//!
//! Core primitives of the Noesis belief language.
//!
//! This crate provides the fundamental building blocks:
//! - [`SemanticType`] - Atomic and functional semantic categories
//! - [`Expression`] - Immutable, partially applicable typed terms
//! - [`Substitution`] - Variable bindings and their composition
//! - [`ProofBasis`] / [`ProofBases`] - Justifications for provable sentences
//! - [`NoesisError`] - Error types

pub mod basis;
pub mod error;
pub mod expression;
pub mod plan;
pub mod substitution;
pub mod types;
pub mod unify;
pub mod vocabulary;

// Re-exports for convenience
pub use basis::{ProofBasis, ProofBases};
pub use error::{NoesisError, Result};
pub use expression::{Argument, Atom, Constant, Expression, Variable};
pub use plan::Plan;
pub use substitution::Substitution;
pub use types::{AtomicType, FunctionType, SemanticType};
pub use vocabulary::{Lexicon, Logical, WordSpec};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::basis::{ProofBasis, ProofBases};
    pub use crate::error::{NoesisError, Result};
    pub use crate::expression::{Argument, Atom, Constant, Expression, Variable};
    pub use crate::plan::Plan;
    pub use crate::substitution::Substitution;
    pub use crate::types::{AtomicType, SemanticType};
    pub use crate::vocabulary::{Lexicon, Logical};
}
