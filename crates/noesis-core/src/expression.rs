//! Typed, partially applicable expressions.
//!
//! An [`Expression`] is a head [`Atom`] plus one [`Argument`] slot per input of
//! the head's type. Slots start out [`Argument::Empty`] and are filled
//! left-to-right by [`Expression::phrase`], which type-checks every argument.
//!
//! Expressions are totally ordered. The order is compatible with substitution:
//! replacing a variable by the bottom sentinel of its type yields a lower bound
//! for every instance of the expression, and the top sentinel an upper bound.
//! The mental store relies on this to answer pattern queries with range scans.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::error::{NoesisError, Result};
use crate::substitution::Substitution;
use crate::types::SemanticType;

/// Position of a symbol relative to ordinary symbols in the expression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Rank {
    Bottom,
    Regular,
    Top,
}

/// A symbol denoting a fixed object, relation or property.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Constant {
    rank: Rank,
    name: String,
    semantic_type: SemanticType,
}

impl Constant {
    /// Create a new constant.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            rank: Rank::Regular,
            name: name.into(),
            semantic_type,
        }
    }

    fn sentinel(rank: Rank, semantic_type: SemanticType) -> Self {
        let name = if rank == Rank::Bottom { "⊥" } else { "⊤" };
        Self {
            rank,
            name: name.to_string(),
            semantic_type,
        }
    }

    /// The constant's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The constant's type.
    pub fn semantic_type(&self) -> &SemanticType {
        &self.semantic_type
    }

    /// Returns true for the bottom and top sentinels.
    pub fn is_sentinel(&self) -> bool {
        self.rank != Rank::Regular
    }
}

/// A unifiable symbol.
///
/// Variables minted during search carry a serial number and never equal a
/// variable made with [`Variable::new`], whatever their names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    name: String,
    serial: Option<usize>,
    semantic_type: SemanticType,
}

impl Variable {
    /// Create a new variable.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            serial: None,
            semantic_type,
        }
    }

    /// A search-internal variable, displayed as `name` followed by `serial`.
    pub fn fresh(name: &str, serial: usize, semantic_type: SemanticType) -> Self {
        Self {
            name: format!("{}{}", name, serial),
            serial: Some(serial),
            semantic_type,
        }
    }

    /// The variable's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for variables minted by [`Variable::fresh`].
    pub fn is_fresh(&self) -> bool {
        self.serial.is_some()
    }

    /// The variable's type.
    pub fn semantic_type(&self) -> &SemanticType {
        &self.semantic_type
    }
}

/// A typed symbol heading an expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    Constant(Constant),
    Variable(Variable),
}

impl Atom {
    /// The symbol's name.
    pub fn name(&self) -> &str {
        match self {
            Atom::Constant(constant) => constant.name(),
            Atom::Variable(variable) => variable.name(),
        }
    }

    /// The symbol's type.
    pub fn semantic_type(&self) -> &SemanticType {
        match self {
            Atom::Constant(constant) => constant.semantic_type(),
            Atom::Variable(variable) => variable.semantic_type(),
        }
    }

    /// The variable, if this atom is one.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Atom::Variable(variable) => Some(variable),
            Atom::Constant(_) => None,
        }
    }

    fn rank(&self) -> Rank {
        match self {
            Atom::Constant(constant) => constant.rank,
            Atom::Variable(_) => Rank::Regular,
        }
    }
}

impl From<Constant> for Atom {
    fn from(constant: Constant) -> Self {
        Atom::Constant(constant)
    }
}

impl From<Variable> for Atom {
    fn from(variable: Variable) -> Self {
        Atom::Variable(variable)
    }
}

/// One argument slot of an expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Argument {
    /// An unfilled slot of the given type.
    Empty(SemanticType),
    /// A filled slot.
    Expression(Expression),
}

impl Argument {
    /// Type of the slot or of the filling expression.
    pub fn semantic_type(&self) -> &SemanticType {
        match self {
            Argument::Empty(semantic_type) => semantic_type,
            Argument::Expression(expression) => expression.semantic_type(),
        }
    }

    /// The filling expression, if any.
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Argument::Expression(expression) => Some(expression),
            Argument::Empty(_) => None,
        }
    }

    /// Returns true for an unfilled slot.
    pub fn is_empty_slot(&self) -> bool {
        matches!(self, Argument::Empty(_))
    }

    fn substitute(&self, substitution: &Substitution) -> Argument {
        match self {
            Argument::Empty(_) => self.clone(),
            Argument::Expression(expression) => {
                Argument::Expression(expression.substitute(substitution))
            }
        }
    }
}

impl From<Expression> for Argument {
    fn from(expression: Expression) -> Self {
        Argument::Expression(expression)
    }
}

/// An immutable typed term.
#[derive(Debug, Clone)]
pub struct Expression {
    head: Atom,
    arguments: Vec<Argument>,
    semantic_type: SemanticType,
}

impl Expression {
    /// Turn an atom into an expression with all of its slots open.
    pub fn word(head: impl Into<Atom>) -> Self {
        let head = head.into();
        let arguments = head
            .semantic_type()
            .inputs()
            .iter()
            .cloned()
            .map(Argument::Empty)
            .collect();
        let semantic_type = head.semantic_type().clone();
        Self {
            head,
            arguments,
            semantic_type,
        }
    }

    /// Word for a new constant.
    pub fn constant(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self::word(Constant::new(name, semantic_type))
    }

    /// Word for a new variable.
    pub fn variable(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self::word(Variable::new(name, semantic_type))
    }

    /// Bottom sentinel of a type: sorts below every ordinary expression.
    pub fn bottom(semantic_type: &SemanticType) -> Self {
        Self::word(Constant::sentinel(Rank::Bottom, semantic_type.clone()))
    }

    /// Top sentinel of a type: sorts above every ordinary expression.
    pub fn top(semantic_type: &SemanticType) -> Self {
        Self::word(Constant::sentinel(Rank::Top, semantic_type.clone()))
    }

    /// Curried application.
    ///
    /// Fills the left-most open slots with `arguments` in order. An
    /// [`Argument::Empty`] keeps its slot open. Each argument must have the
    /// type of the slot it lands in.
    pub fn phrase<I>(&self, arguments: I) -> Result<Self>
    where
        I: IntoIterator<Item = Argument>,
    {
        let supplied: Vec<Argument> = arguments.into_iter().collect();
        let open: Vec<usize> = self
            .arguments
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_empty_slot())
            .map(|(index, _)| index)
            .collect();

        if supplied.len() > open.len() {
            return Err(NoesisError::Arity {
                expression: self.to_string(),
                open_slots: open.len(),
                supplied: supplied.len(),
            });
        }

        let mut filled = self.arguments.clone();
        for (index, argument) in open.into_iter().zip(supplied) {
            let expected = filled[index].semantic_type();
            if expected != argument.semantic_type() {
                return Err(NoesisError::TypeMismatch {
                    expected: expected.clone(),
                    found: argument.semantic_type().clone(),
                });
            }
            filled[index] = argument;
        }

        Ok(Self::assemble(self.head.clone(), filled))
    }

    /// Apply to a list of expressions. Shorthand for [`Expression::phrase`].
    pub fn apply(&self, arguments: &[Expression]) -> Result<Self> {
        self.phrase(arguments.iter().cloned().map(Argument::Expression))
    }

    pub(crate) fn assemble(head: Atom, arguments: Vec<Argument>) -> Self {
        let remaining = arguments
            .iter()
            .filter_map(|argument| match argument {
                Argument::Empty(semantic_type) => Some(semantic_type.clone()),
                Argument::Expression(_) => None,
            })
            .collect();
        let semantic_type = SemanticType::narrowed(head.semantic_type().output(), remaining);
        Self {
            head,
            arguments,
            semantic_type,
        }
    }

    /// Fill open slots without type checks; callers guarantee well-typedness.
    pub(crate) fn fill_slots(&self, incoming: Vec<Argument>) -> Self {
        let mut arguments = self.arguments.clone();
        let mut incoming = incoming.into_iter();
        for slot in arguments.iter_mut().filter(|slot| slot.is_empty_slot()) {
            match incoming.next() {
                Some(argument) => *slot = argument,
                None => break,
            }
        }
        Self::assemble(self.head.clone(), arguments)
    }

    /// The head symbol.
    pub fn head(&self) -> &Atom {
        &self.head
    }

    /// All argument slots, filled or not.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// The filled argument at `index`.
    pub fn argument(&self, index: usize) -> Option<&Expression> {
        self.arguments.get(index).and_then(Argument::as_expression)
    }

    /// The expression's type, narrowed by the filled slots.
    pub fn semantic_type(&self) -> &SemanticType {
        &self.semantic_type
    }

    /// Returns true if this is a truth-value expression.
    pub fn is_sentence(&self) -> bool {
        self.semantic_type.is_sentence()
    }

    /// Fail with [`NoesisError::NotASentence`] unless this is a sentence.
    pub fn expect_sentence(&self) -> Result<()> {
        if self.is_sentence() {
            Ok(())
        } else {
            Err(NoesisError::NotASentence {
                expression: self.to_string(),
                found: self.semantic_type.clone(),
            })
        }
    }

    /// Number of open slots.
    pub fn open_slots(&self) -> usize {
        self.arguments.iter().filter(|slot| slot.is_empty_slot()).count()
    }

    /// Free variables, head included.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables(&self, variables: &mut BTreeSet<Variable>) {
        if let Atom::Variable(variable) = &self.head {
            variables.insert(variable.clone());
        }
        for argument in &self.arguments {
            if let Argument::Expression(expression) = argument {
                expression.collect_variables(variables);
            }
        }
    }

    /// Returns true if `constant` occurs anywhere in the expression.
    pub fn mentions(&self, constant: &Constant) -> bool {
        matches!(&self.head, Atom::Constant(head) if head == constant)
            || self
                .arguments
                .iter()
                .filter_map(Argument::as_expression)
                .any(|argument| argument.mentions(constant))
    }

    /// Returns true if no variable occurs in the expression.
    pub fn is_ground(&self) -> bool {
        self.head.as_variable().is_none()
            && self
                .arguments
                .iter()
                .filter_map(Argument::as_expression)
                .all(Expression::is_ground)
    }

    /// Structural depth: a word has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .arguments
            .iter()
            .filter_map(Argument::as_expression)
            .map(Expression::depth)
            .max()
            .unwrap_or(0)
    }

    /// Replace variables simultaneously.
    ///
    /// A bound variable heading an application is replaced by its value
    /// applied to the (substituted) arguments.
    pub fn substitute(&self, substitution: &Substitution) -> Self {
        if substitution.is_empty() {
            return self.clone();
        }
        let arguments: Vec<Argument> = self
            .arguments
            .iter()
            .map(|argument| argument.substitute(substitution))
            .collect();
        match self.head.as_variable().and_then(|v| substitution.get(v)) {
            Some(value) => value.fill_slots(arguments),
            None => Self::assemble(self.head.clone(), arguments),
        }
    }

    /// Lower and upper bounds of every instance of this expression.
    pub fn range_bounds(&self) -> (Expression, Expression) {
        let mut lower = Substitution::new();
        let mut upper = Substitution::new();
        for variable in self.variables() {
            let semantic_type = variable.semantic_type().clone();
            lower.insert_unchecked(variable.clone(), Expression::bottom(&semantic_type));
            upper.insert_unchecked(variable, Expression::top(&semantic_type));
        }
        (self.substitute(&lower), self.substitute(&upper))
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.arguments == other.arguments
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.head.hash(state);
        self.arguments.hash(state);
    }
}

impl Ord for Expression {
    fn cmp(&self, other: &Self) -> Ordering {
        // Sentinel heads dominate so that substituting them bounds every instance.
        self.head
            .rank()
            .cmp(&other.head.rank())
            .then_with(|| self.head.cmp(&other.head))
            .then_with(|| self.arguments.cmp(&other.arguments))
    }
}

impl PartialOrd for Expression {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head.name())?;
        if self.arguments.iter().all(Argument::is_empty_slot) {
            return Ok(());
        }
        write!(f, "(")?;
        for (index, argument) in self.arguments.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match argument {
                Argument::Empty(_) => write!(f, "_")?,
                Argument::Expression(expression) => write!(f, "{}", expression)?,
            }
        }
        write!(f, ")")
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AtomicType;

    fn individual(name: &str) -> Expression {
        Expression::constant(name, SemanticType::individual())
    }

    fn at() -> Expression {
        Expression::constant("AT", SemanticType::relation())
    }

    #[test]
    fn test_word_has_open_slots() {
        let at = at();
        assert_eq!(at.open_slots(), 2);
        assert_eq!(at.semantic_type(), &SemanticType::relation());
        assert_eq!(at.to_string(), "AT");
    }

    #[test]
    fn test_phrase_fills_left_to_right() {
        let partial = at().apply(&[individual("SELF")]).unwrap();
        assert_eq!(partial.semantic_type(), &SemanticType::predicate());
        assert_eq!(partial.to_string(), "AT(SELF, _)");

        let full = partial.apply(&[individual("p1")]).unwrap();
        assert!(full.is_sentence());
        assert_eq!(full.to_string(), "AT(SELF, p1)");
        assert_eq!(full, at().apply(&[individual("SELF"), individual("p1")]).unwrap());
    }

    #[test]
    fn test_phrase_skips_with_empty_argument() {
        let partial = at()
            .phrase(vec![
                Argument::Empty(SemanticType::individual()),
                Argument::Expression(individual("p1")),
            ])
            .unwrap();
        assert_eq!(partial.to_string(), "AT(_, p1)");
        let full = partial.apply(&[individual("SELF")]).unwrap();
        assert_eq!(full.to_string(), "AT(SELF, p1)");
    }

    #[test]
    fn test_phrase_type_mismatch() {
        let sentence = at().apply(&[individual("a"), individual("b")]).unwrap();
        let result = at().apply(&[sentence]);
        assert!(matches!(result, Err(NoesisError::TypeMismatch { .. })));
    }

    #[test]
    fn test_phrase_arity() {
        let result = at().apply(&[individual("a"), individual("b"), individual("c")]);
        assert!(matches!(result, Err(NoesisError::Arity { supplied: 3, .. })));

        let full = at().apply(&[individual("a"), individual("b")]).unwrap();
        assert!(full.apply(&[individual("c")]).is_err());
    }

    #[test]
    fn test_phrase_leaves_original_untouched() {
        let at = at();
        let _ = at.apply(&[individual("a")]).unwrap();
        assert_eq!(at.open_slots(), 2);
    }

    #[test]
    fn test_variables_and_groundness() {
        let x = Expression::variable("x", SemanticType::individual());
        let open = at().apply(&[x.clone(), individual("p1")]).unwrap();
        assert!(!open.is_ground());
        assert_eq!(open.variables().len(), 1);
        assert_eq!(open.depth(), 2);

        let closed = at().apply(&[individual("p1"), individual("p1")]).unwrap();
        assert!(closed.is_ground());
    }

    #[test]
    fn test_fresh_variable_differs_from_namesake() {
        let fresh = Variable::fresh("_v", 1, SemanticType::individual());
        let user = Variable::new("_v1", SemanticType::individual());
        assert_eq!(fresh.name(), user.name());
        assert!(fresh.is_fresh() && !user.is_fresh());
        assert_ne!(fresh, user);

        let both = at()
            .apply(&[Expression::word(user), Expression::word(fresh)])
            .unwrap();
        assert_eq!(both.variables().len(), 2);
    }

    #[test]
    fn test_mentions_nested_constant() {
        let p1 = Constant::new("p1", SemanticType::individual());
        let sentence = at()
            .apply(&[individual("SELF"), Expression::word(p1.clone())])
            .unwrap();
        assert!(sentence.mentions(&p1));
        assert!(!sentence.mentions(&Constant::new("p2", SemanticType::individual())));
    }

    #[test]
    fn test_substitute_head_variable_applies_value() {
        let predicate = Variable::new("F", SemanticType::predicate());
        let pattern = Expression::word(predicate.clone())
            .apply(&[individual("p1")])
            .unwrap();
        let value = at().apply(&[individual("SELF")]).unwrap();
        let substitution = Substitution::new().bind(predicate, value).unwrap();

        let result = pattern.substitute(&substitution);
        assert_eq!(result.to_string(), "AT(SELF, p1)");
        assert!(result.is_sentence());
    }

    #[test]
    fn test_sentinels_bound_everything() {
        let t = SemanticType::truth_value();
        let sentence = at().apply(&[individual("a"), individual("b")]).unwrap();
        assert!(Expression::bottom(&t) < sentence);
        assert!(sentence < Expression::top(&t));
    }

    #[test]
    fn test_range_bounds_contain_instances() {
        let x = Expression::variable("x", SemanticType::individual());
        let pattern = at().apply(&[x, individual("p2")]).unwrap();
        let (lower, upper) = pattern.range_bounds();

        for name in ["a", "p1", "zzz"] {
            let instance = at().apply(&[individual(name), individual("p2")]).unwrap();
            assert!(lower <= instance && instance <= upper, "{} out of range", instance);
        }

        let nested = at()
            .apply(&[individual("p0"), individual("p2")])
            .unwrap();
        let other_relation = Expression::constant("NEAR", SemanticType::relation())
            .apply(&[individual("p0"), individual("p2")])
            .unwrap();
        assert!(lower <= nested && nested <= upper);
        assert!(!(lower <= other_relation && other_relation <= upper));
    }

    #[test]
    fn test_range_bounds_for_head_variable() {
        let predicate = Expression::variable("F", SemanticType::predicate());
        let pattern = predicate.apply(&[individual("p1")]).unwrap();
        let (lower, upper) = pattern.range_bounds();

        let tomato = Expression::constant("TOMATO", SemanticType::predicate())
            .apply(&[individual("p1")])
            .unwrap();
        assert!(lower < tomato && tomato < upper);
    }

    #[test]
    fn test_conformity_output() {
        let will = Expression::constant(
            "WILL",
            SemanticType::function(vec![SemanticType::truth_value()], AtomicType::ConformityValue)
                .unwrap(),
        );
        let sentence = at().apply(&[individual("a"), individual("b")]).unwrap();
        let action = will.apply(&[sentence]).unwrap();
        assert!(action.semantic_type().is_conformity());
    }

    #[test]
    fn test_serialize_as_text() {
        let sentence = at().apply(&[individual("a"), individual("b")]).unwrap();
        assert_eq!(serde_json::to_string(&sentence).unwrap(), "\"AT(a, b)\"");
    }
}
