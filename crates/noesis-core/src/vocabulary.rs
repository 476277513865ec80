//! The logical vocabulary and the lexicon of domain words.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{NoesisError, Result};
use crate::expression::{Atom, Constant, Expression};
use crate::types::{AtomicType, SemanticType};

/// Words with a fixed meaning to the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logical {
    /// `TRULY(s)`: s is true.
    Truly,
    /// `NOT(s)`.
    Not,
    /// `AND(s, r)`.
    And,
    /// `OR(s, r)`.
    Or,
    /// `IDENTITY(a, b)`: a and b are the same individual.
    Identity,
    /// `SOME(F, G)`: some F is G.
    Exists,
    /// `ABLE(x, s)`: x can bring about s.
    Able,
    /// `WILL(s)`: the plan to bring about s. Conformity-valued.
    Will,
    /// `SEE(s)`: s was perceived.
    See,
    /// `GOOD(s)`: s is desired.
    Good,
    /// `SAY(x, s)`: x says s.
    Say,
    /// `SELF`: the agent itself.
    Myself,
    /// `NEUTRAL`: the action of doing nothing.
    Neutral,
}

impl Logical {
    /// Every logical word.
    pub const ALL: [Logical; 13] = [
        Logical::Truly,
        Logical::Not,
        Logical::And,
        Logical::Or,
        Logical::Identity,
        Logical::Exists,
        Logical::Able,
        Logical::Will,
        Logical::See,
        Logical::Good,
        Logical::Say,
        Logical::Myself,
        Logical::Neutral,
    ];

    /// The word's spelling.
    pub fn name(self) -> &'static str {
        match self {
            Logical::Truly => "TRULY",
            Logical::Not => "NOT",
            Logical::And => "AND",
            Logical::Or => "OR",
            Logical::Identity => "IDENTITY",
            Logical::Exists => "SOME",
            Logical::Able => "ABLE",
            Logical::Will => "WILL",
            Logical::See => "SEE",
            Logical::Good => "GOOD",
            Logical::Say => "SAY",
            Logical::Myself => "SELF",
            Logical::Neutral => "NEUTRAL",
        }
    }

    /// The word's type.
    pub fn semantic_type(self) -> SemanticType {
        let e = SemanticType::individual;
        let t = SemanticType::truth_value;
        match self {
            Logical::Truly | Logical::Not | Logical::See | Logical::Good => {
                SemanticType::narrowed(AtomicType::TruthValue, vec![t()])
            }
            Logical::And | Logical::Or => {
                SemanticType::narrowed(AtomicType::TruthValue, vec![t(), t()])
            }
            Logical::Identity => SemanticType::relation(),
            Logical::Exists => SemanticType::narrowed(
                AtomicType::TruthValue,
                vec![SemanticType::predicate(), SemanticType::predicate()],
            ),
            Logical::Able | Logical::Say => {
                SemanticType::narrowed(AtomicType::TruthValue, vec![e(), t()])
            }
            Logical::Will => SemanticType::narrowed(AtomicType::ConformityValue, vec![t()]),
            Logical::Myself => e(),
            Logical::Neutral => SemanticType::conformity_value(),
        }
    }

    /// The word as a constant.
    pub fn constant(self) -> Constant {
        Constant::new(self.name(), self.semantic_type())
    }

    /// The word as an expression with every slot open.
    pub fn word(self) -> Expression {
        Expression::word(self.constant())
    }

    /// Apply the word to arguments.
    pub fn apply(self, arguments: &[Expression]) -> Result<Expression> {
        self.word().apply(arguments)
    }

    /// Returns true if `expression` is headed by this word.
    pub fn heads(self, expression: &Expression) -> bool {
        match expression.head() {
            Atom::Constant(constant) => {
                constant.name() == self.name() && *constant.semantic_type() == self.semantic_type()
            }
            Atom::Variable(_) => false,
        }
    }

    /// The logical word heading `expression`, if any.
    pub fn of(expression: &Expression) -> Option<Logical> {
        Self::ALL.into_iter().find(|word| word.heads(expression))
    }
}

/// A serialized word definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpec {
    pub name: String,
    pub semantic_type: SemanticType,
}

/// Named constants known to an agent.
///
/// Always contains the [`Logical`] words.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: BTreeMap<String, Constant>,
}

impl Lexicon {
    /// Create a lexicon holding the logical vocabulary.
    pub fn new() -> Self {
        let words = Logical::ALL
            .iter()
            .map(|word| (word.name().to_string(), word.constant()))
            .collect();
        Self { words }
    }

    /// Parse word definitions from JSON and add them to a fresh lexicon.
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<WordSpec> = serde_json::from_str(json)?;
        let mut lexicon = Self::new();
        lexicon.extend_from(&specs)?;
        Ok(lexicon)
    }

    /// Define a word. Redefining with the same type is a no-op.
    pub fn define(&mut self, name: impl Into<String>, semantic_type: SemanticType) -> Result<Constant> {
        let name = name.into();
        if let Some(existing) = self.words.get(&name) {
            if *existing.semantic_type() != semantic_type {
                return Err(NoesisError::TypeMismatch {
                    expected: existing.semantic_type().clone(),
                    found: semantic_type,
                });
            }
            return Ok(existing.clone());
        }
        let constant = Constant::new(name.clone(), semantic_type);
        self.words.insert(name, constant.clone());
        Ok(constant)
    }

    /// Define every word of `specs`.
    pub fn extend_from(&mut self, specs: &[WordSpec]) -> Result<()> {
        for spec in specs {
            self.define(spec.name.clone(), spec.semantic_type.clone())?;
        }
        Ok(())
    }

    /// Look up a constant.
    pub fn constant(&self, name: &str) -> Result<Constant> {
        self.words
            .get(name)
            .cloned()
            .ok_or_else(|| NoesisError::UnknownWord(name.to_string()))
    }

    /// Look up a word as an expression.
    pub fn word(&self, name: &str) -> Result<Expression> {
        Ok(Expression::word(self.constant(name)?))
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the lexicon holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over words in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.words.values()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_roundtrip() {
        for word in Logical::ALL {
            assert_eq!(Logical::of(&word.word()), Some(word));
        }
        let impostor = Expression::constant("AND", SemanticType::truth_value());
        assert_eq!(Logical::of(&impostor), None);
    }

    #[test]
    fn test_will_is_conformity_valued() {
        let sentence = Logical::Myself.word();
        let tomato = Expression::constant("TOMATO", SemanticType::predicate())
            .apply(&[sentence])
            .unwrap();
        let action = Logical::Will.apply(&[tomato]).unwrap();
        assert!(action.semantic_type().is_conformity());
    }

    #[test]
    fn test_lexicon_define_and_lookup() {
        let mut lexicon = Lexicon::new();
        lexicon.define("TOMATO", SemanticType::predicate()).unwrap();
        assert!(lexicon.word("TOMATO").is_ok());
        assert!(lexicon.define("TOMATO", SemanticType::predicate()).is_ok());
        assert!(lexicon.define("TOMATO", SemanticType::relation()).is_err());
        assert_eq!(
            lexicon.constant("POTATO"),
            Err(NoesisError::UnknownWord("POTATO".to_string()))
        );
    }

    #[test]
    fn test_lexicon_from_json() {
        let json = r#"[
            {"name": "BOARD", "semantic_type": {"functional": {"inputs": [{"atomic": "individual"}], "output": "truth_value"}}}
        ]"#;
        let lexicon = Lexicon::from_json(json).unwrap();
        assert_eq!(lexicon.len(), Logical::ALL.len() + 1);
        assert_eq!(
            lexicon.constant("BOARD").unwrap().semantic_type(),
            &SemanticType::predicate()
        );
    }
}
