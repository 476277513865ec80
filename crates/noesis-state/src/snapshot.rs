//! Read-only views of the mental store.

use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::Arc;

use noesis_core::{Expression, Logical};

/// Which of the two sentence sets to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    /// Observed facts.
    Visual,
    /// Desired facts, stored as `GOOD(s)`.
    Evaluative,
}

impl Base {
    /// The base that can hold instances of `sentence`.
    pub fn for_sentence(sentence: &Expression) -> Base {
        if Logical::Good.heads(sentence) {
            Base::Evaluative
        } else {
            Base::Visual
        }
    }
}

/// A point-in-time, copy-on-write view of the beliefs and desires.
///
/// Searches hold a view across many ticks; later writes to the store never
/// show up in a view that was taken before them.
#[derive(Debug, Clone, Default)]
pub struct BeliefView {
    pub(crate) visual: Arc<BTreeSet<Expression>>,
    pub(crate) evaluative: Arc<BTreeSet<Expression>>,
    pub(crate) max_depth: usize,
    pub(crate) generation: u64,
}

impl BeliefView {
    /// A view with no beliefs and no desires.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The sentences of one base.
    pub fn base(&self, base: Base) -> &BTreeSet<Expression> {
        match base {
            Base::Visual => &self.visual,
            Base::Evaluative => &self.evaluative,
        }
    }

    /// Returns true if the sentence is literally in the base.
    pub fn contains(&self, base: Base, sentence: &Expression) -> bool {
        self.base(base).contains(sentence)
    }

    /// Sentences of the base that may be instances of `pattern`.
    ///
    /// The result is a superset of the actual instances; callers unify each
    /// candidate against the pattern.
    pub fn candidates(&self, base: Base, pattern: &Expression) -> Vec<&Expression> {
        let (lower, upper) = pattern.range_bounds();
        self.base(base)
            .range::<Expression, _>((Bound::Included(&lower), Bound::Included(&upper)))
            .collect()
    }

    /// The first sentence of the base after `lower`, up to `upper` inclusive.
    ///
    /// Lets a resumable scan continue from the last candidate it handled.
    pub fn next_candidate(
        &self,
        base: Base,
        lower: Bound<&Expression>,
        upper: &Expression,
    ) -> Option<&Expression> {
        self.base(base)
            .range::<Expression, _>((lower, Bound::Included(upper)))
            .next()
    }

    /// Desired sentences, in canonical order.
    pub fn desires(&self) -> impl Iterator<Item = &Expression> {
        self.evaluative
            .iter()
            .filter(|sentence| Logical::Good.heads(sentence))
            .filter_map(|sentence| sentence.argument(0))
    }

    /// Deepest structural depth of any stored sentence.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Store generation the view was taken at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total number of stored sentences.
    pub fn len(&self) -> usize {
        self.visual.len() + self.evaluative.len()
    }

    /// Returns true if nothing is believed or desired.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
