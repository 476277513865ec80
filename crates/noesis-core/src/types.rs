//! Semantic types of the belief language.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NoesisError, Result};

/// Atomic semantic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomicType {
    /// Objects, places and agents.
    Individual,
    /// Truth values. Every sentence has this type.
    TruthValue,
    /// Conformity values. Planned actions have this type.
    ConformityValue,
    /// Asserted content.
    Assertion,
    /// Asked content.
    Question,
}

impl AtomicType {
    /// Short symbol used when printing types.
    pub fn symbol(&self) -> &'static str {
        match self {
            AtomicType::Individual => "e",
            AtomicType::TruthValue => "t",
            AtomicType::ConformityValue => "c",
            AtomicType::Assertion => "a",
            AtomicType::Question => "q",
        }
    }
}

/// A functional type: ordered inputs and an atomic output.
///
/// Always has at least one input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFunctionType")]
pub struct FunctionType {
    inputs: Vec<SemanticType>,
    output: AtomicType,
}

#[derive(Deserialize)]
struct RawFunctionType {
    inputs: Vec<SemanticType>,
    output: AtomicType,
}

impl TryFrom<RawFunctionType> for FunctionType {
    type Error = NoesisError;

    fn try_from(raw: RawFunctionType) -> Result<Self> {
        FunctionType::new(raw.inputs, raw.output)
    }
}

impl FunctionType {
    /// Create a functional type, rejecting an empty input list.
    pub fn new(inputs: Vec<SemanticType>, output: AtomicType) -> Result<Self> {
        if inputs.is_empty() {
            return Err(NoesisError::EmptyFunctionalType);
        }
        Ok(Self { inputs, output })
    }

    /// The input types, in argument order.
    pub fn inputs(&self) -> &[SemanticType] {
        &self.inputs
    }

    /// The output type.
    pub fn output(&self) -> AtomicType {
        self.output
    }
}

/// Type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// An atomic category.
    Atomic(AtomicType),
    /// A function from inputs to an atomic output.
    Functional(FunctionType),
}

impl SemanticType {
    /// The individual type `e`.
    pub fn individual() -> Self {
        SemanticType::Atomic(AtomicType::Individual)
    }

    /// The truth-value type `t`.
    pub fn truth_value() -> Self {
        SemanticType::Atomic(AtomicType::TruthValue)
    }

    /// The conformity-value type `c`.
    pub fn conformity_value() -> Self {
        SemanticType::Atomic(AtomicType::ConformityValue)
    }

    /// Create a functional type.
    pub fn function(inputs: Vec<SemanticType>, output: AtomicType) -> Result<Self> {
        Ok(SemanticType::Functional(FunctionType::new(inputs, output)?))
    }

    /// One-place predicate of individuals, `<e,t>`.
    pub fn predicate() -> Self {
        Self::narrowed(AtomicType::TruthValue, vec![Self::individual()])
    }

    /// Two-place relation between individuals, `<e,e,t>`.
    pub fn relation() -> Self {
        Self::narrowed(
            AtomicType::TruthValue,
            vec![Self::individual(), Self::individual()],
        )
    }

    /// Build the type left after some inputs were consumed.
    pub(crate) fn narrowed(output: AtomicType, inputs: Vec<SemanticType>) -> Self {
        if inputs.is_empty() {
            SemanticType::Atomic(output)
        } else {
            SemanticType::Functional(FunctionType { inputs, output })
        }
    }

    /// Input types; empty for atomic types.
    pub fn inputs(&self) -> &[SemanticType] {
        match self {
            SemanticType::Atomic(_) => &[],
            SemanticType::Functional(function) => function.inputs(),
        }
    }

    /// Output type; an atomic type is its own output.
    pub fn output(&self) -> AtomicType {
        match self {
            SemanticType::Atomic(atomic) => *atomic,
            SemanticType::Functional(function) => function.output(),
        }
    }

    /// Number of inputs.
    pub fn arity(&self) -> usize {
        self.inputs().len()
    }

    /// Returns true for the truth-value type.
    pub fn is_sentence(&self) -> bool {
        matches!(self, SemanticType::Atomic(AtomicType::TruthValue))
    }

    /// Returns true for the conformity-value type.
    pub fn is_conformity(&self) -> bool {
        matches!(self, SemanticType::Atomic(AtomicType::ConformityValue))
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Atomic(atomic) => write!(f, "{}", atomic.symbol()),
            SemanticType::Functional(function) => {
                write!(f, "<")?;
                for input in function.inputs() {
                    write!(f, "{},", input)?;
                }
                write!(f, "{}>", function.output().symbol())
            }
        }
    }
}

impl From<AtomicType> for SemanticType {
    fn from(atomic: AtomicType) -> Self {
        SemanticType::Atomic(atomic)
    }
}
