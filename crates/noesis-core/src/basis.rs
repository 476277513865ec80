//! Proof bases: the justifications found for a sentence.
//!
//! A [`ProofBasis`] is one way of proving a sentence: the premises it rests on
//! plus the variable bindings under which it holds. [`ProofBases`] collects the
//! alternatives; the sentence is provable by any one of them.

use std::collections::{btree_set, BTreeSet};

use serde::Serialize;

use crate::expression::{Expression, Variable};
use crate::substitution::Substitution;

/// Premises and bindings underwriting one proof.
///
/// Premise order encodes dependency: later premises may presuppose earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProofBasis {
    premises: Vec<Expression>,
    substitution: Substitution,
}

impl ProofBasis {
    /// Create a basis.
    pub fn new(premises: Vec<Expression>, substitution: Substitution) -> Self {
        Self {
            premises,
            substitution,
        }
    }

    /// A basis with no premises and no bindings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A basis resting on a single premise.
    pub fn premise(premise: Expression) -> Self {
        Self::new(vec![premise], Substitution::new())
    }

    /// A basis that only records bindings.
    pub fn binding(substitution: Substitution) -> Self {
        Self::new(Vec::new(), substitution)
    }

    /// The premises, in dependency order.
    pub fn premises(&self) -> &[Expression] {
        &self.premises
    }

    /// The shared substitution.
    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    /// Joint proof: `self` first, then `other` under `self`'s bindings.
    pub fn product(&self, other: &ProofBasis) -> ProofBasis {
        let mut premises = self.premises.clone();
        premises.extend(
            other
                .premises
                .iter()
                .map(|premise| premise.substitute(&self.substitution)),
        );
        ProofBasis {
            premises,
            substitution: self.substitution.compose(&other.substitution),
        }
    }

    /// Drop bindings of variables outside `variables`.
    pub fn restrict(&self, variables: &BTreeSet<Variable>) -> ProofBasis {
        ProofBasis {
            premises: self.premises.clone(),
            substitution: self.substitution.restrict(variables),
        }
    }

    /// Conformity-typed premises: the planned actions.
    pub fn actions(&self) -> Vec<Expression> {
        self.premises
            .iter()
            .filter(|premise| premise.semantic_type().is_conformity())
            .cloned()
            .collect()
    }
}

/// Alternative proofs of one sentence, deduplicated by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProofBases {
    bases: BTreeSet<ProofBasis>,
}

impl ProofBases {
    /// Create an empty set: no proof known.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one basis.
    pub fn single(basis: ProofBasis) -> Self {
        let mut bases = Self::new();
        bases.insert(basis);
        bases
    }

    /// Add an alternative. Returns false if it was already present.
    pub fn insert(&mut self, basis: ProofBasis) -> bool {
        self.bases.insert(basis)
    }

    /// Logical OR: absorb every alternative of `other`.
    pub fn join(&mut self, other: ProofBases) {
        self.bases.extend(other.bases);
    }

    /// Logical AND: every pairing of an alternative here with one of `other`.
    pub fn meet(&self, other: &ProofBases) -> ProofBases {
        self.bases
            .iter()
            .flat_map(|left| other.bases.iter().map(move |right| left.product(right)))
            .collect()
    }

    /// Number of alternatives.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Returns true if no proof is known.
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Returns true if the basis is one of the alternatives.
    pub fn contains(&self, basis: &ProofBasis) -> bool {
        self.bases.contains(basis)
    }

    /// Forget every alternative.
    pub fn clear(&mut self) {
        self.bases.clear();
    }

    /// Iterate over alternatives in their canonical order.
    pub fn iter(&self) -> btree_set::Iter<'_, ProofBasis> {
        self.bases.iter()
    }

    /// Restrict every alternative's bindings to `variables`.
    pub fn restrict(self, variables: &BTreeSet<Variable>) -> ProofBases {
        self.bases
            .into_iter()
            .map(|basis| basis.restrict(variables))
            .collect()
    }
}

impl FromIterator<ProofBasis> for ProofBases {
    fn from_iter<I: IntoIterator<Item = ProofBasis>>(iter: I) -> Self {
        Self {
            bases: iter.into_iter().collect(),
        }
    }
}

impl Extend<ProofBasis> for ProofBases {
    fn extend<I: IntoIterator<Item = ProofBasis>>(&mut self, iter: I) {
        self.bases.extend(iter);
    }
}

impl IntoIterator for ProofBases {
    type Item = ProofBasis;
    type IntoIter = btree_set::IntoIter<ProofBasis>;

    fn into_iter(self) -> Self::IntoIter {
        self.bases.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProofBases {
    type Item = &'a ProofBasis;
    type IntoIter = btree_set::Iter<'a, ProofBasis>;

    fn into_iter(self) -> Self::IntoIter {
        self.bases.iter()
    }
}
