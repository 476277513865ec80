//! Variable substitutions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{NoesisError, Result};
use crate::expression::{Expression, Variable};

/// A finite, well-typed mapping from variables to expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Substitution {
    bindings: BTreeMap<Variable, Expression>,
}

impl Substitution {
    /// Create an empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, builder style.
    pub fn bind(mut self, variable: Variable, value: Expression) -> Result<Self> {
        self.insert(variable, value)?;
        Ok(self)
    }

    /// Add a binding, returning the previous value.
    ///
    /// The value must have the variable's type.
    pub fn insert(&mut self, variable: Variable, value: Expression) -> Result<Option<Expression>> {
        if variable.semantic_type() != value.semantic_type() {
            return Err(NoesisError::TypeMismatch {
                expected: variable.semantic_type().clone(),
                found: value.semantic_type().clone(),
            });
        }
        Ok(self.bindings.insert(variable, value))
    }

    pub(crate) fn insert_unchecked(&mut self, variable: Variable, value: Expression) {
        self.bindings.insert(variable, value);
    }

    /// The value bound to a variable.
    pub fn get(&self, variable: &Variable) -> Option<&Expression> {
        self.bindings.get(variable)
    }

    /// Returns true if the variable is bound.
    pub fn contains(&self, variable: &Variable) -> bool {
        self.bindings.contains_key(variable)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Expression)> {
        self.bindings.iter()
    }

    /// Composition: substituting with the result equals substituting with
    /// `self` and then with `other`. Bindings of `self` take precedence.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut bindings: BTreeMap<Variable, Expression> = self
            .bindings
            .iter()
            .map(|(variable, value)| (variable.clone(), value.substitute(other)))
            .collect();
        for (variable, value) in &other.bindings {
            bindings
                .entry(variable.clone())
                .or_insert_with(|| value.clone());
        }
        Substitution { bindings }
    }

    /// Keep only the bindings of the given variables.
    pub fn restrict(&self, variables: &BTreeSet<Variable>) -> Substitution {
        let bindings = self
            .bindings
            .iter()
            .filter(|(variable, _)| variables.contains(*variable))
            .map(|(variable, value)| (variable.clone(), value.clone()))
            .collect();
        Substitution { bindings }
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (variable, value)) in self.bindings.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} ↦ {}", variable.name(), value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Substitution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.bindings
                .iter()
                .map(|(variable, value)| (variable.name(), value)),
        )
    }
}
