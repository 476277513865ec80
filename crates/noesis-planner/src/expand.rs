//! Expansions: the subgoals a lemma is reduced to below the depth bound.
//!
//! An expansion hands out child lemmas one at a time, receives each child's
//! bases, and finally contributes its own bases to the expanding node.

use std::collections::VecDeque;

use noesis_core::{Expression, Logical, NoesisError, ProofBasis, ProofBases, Result, Variable};

/// Pending subgoal work of one search node.
#[derive(Debug, Clone)]
pub(crate) enum Expansion {
    /// The lemma holds if the replacement holds.
    Rewrite {
        lemma: Expression,
        launched: bool,
        results: ProofBases,
    },

    /// Every conjunct must hold, later ones under earlier bindings.
    Conjunction(Conjunction),

    /// The agent can bring the lemma about, which it plans to do.
    Ability {
        able: Expression,
        action: Expression,
        launched: bool,
        results: ProofBases,
    },

    /// Negation as failure: `assumed` holds unless `probe` is provable.
    Assumption {
        probe: Expression,
        assumed: Expression,
        launched: bool,
        refuted: bool,
    },
}

impl Expansion {
    pub(crate) fn rewrite(lemma: Expression) -> Self {
        Expansion::Rewrite {
            lemma,
            launched: false,
            results: ProofBases::new(),
        }
    }

    pub(crate) fn conjunction(conjuncts: Vec<Expression>) -> Self {
        Expansion::Conjunction(Conjunction::new(conjuncts))
    }

    /// `ABLE(SELF, lemma)`, paying off with the action `WILL(lemma)`.
    pub(crate) fn ability(lemma: &Expression) -> Result<Self> {
        Ok(Expansion::Ability {
            able: Logical::Able.apply(&[Logical::Myself.word(), lemma.clone()])?,
            action: Logical::Will.apply(&[lemma.clone()])?,
            launched: false,
            results: ProofBases::new(),
        })
    }

    pub(crate) fn assumption(probe: Expression, assumed: Expression) -> Self {
        Expansion::Assumption {
            probe,
            assumed,
            launched: false,
            refuted: false,
        }
    }

    /// The next child lemma to search, or `None` once all children are done.
    pub(crate) fn next_child(&mut self) -> Option<Expression> {
        match self {
            Expansion::Rewrite {
                lemma, launched, ..
            } => launch(launched, lemma),
            Expansion::Ability { able, launched, .. } => launch(launched, able),
            Expansion::Assumption {
                probe, launched, ..
            } => launch(launched, probe),
            Expansion::Conjunction(conjunction) => conjunction.next_child(),
        }
    }

    /// Children of a probe only need to find one basis.
    pub(crate) fn is_probe(&self) -> bool {
        matches!(self, Expansion::Assumption { .. })
    }

    /// Take the bases of the child most recently handed out.
    pub(crate) fn receive(&mut self, bases: ProofBases) {
        match self {
            Expansion::Rewrite { results, .. } | Expansion::Ability { results, .. } => {
                results.join(bases)
            }
            Expansion::Assumption { refuted, .. } => *refuted |= !bases.is_empty(),
            Expansion::Conjunction(conjunction) => conjunction.receive(bases),
        }
    }

    /// The bases this expansion contributes.
    pub(crate) fn finish(self) -> ProofBases {
        match self {
            Expansion::Rewrite { results, .. } => results,
            Expansion::Ability {
                action, results, ..
            } => {
                let planned = ProofBasis::premise(action);
                results
                    .into_iter()
                    .map(|basis| basis.product(&planned))
                    .collect()
            }
            Expansion::Assumption {
                assumed, refuted, ..
            } => {
                if refuted {
                    ProofBases::new()
                } else {
                    ProofBases::single(ProofBasis::premise(assumed))
                }
            }
            Expansion::Conjunction(conjunction) => conjunction.gathered,
        }
    }
}

fn launch(launched: &mut bool, lemma: &Expression) -> Option<Expression> {
    if *launched {
        None
    } else {
        *launched = true;
        Some(lemma.clone())
    }
}

/// A conjunctive split.
///
/// Each conjunct is searched once per basis of the conjuncts before it, with
/// that basis's bindings substituted in; results combine by product.
#[derive(Debug, Clone)]
pub(crate) struct Conjunction {
    conjuncts: Vec<Expression>,
    index: usize,
    pending: VecDeque<ProofBasis>,
    current: Option<ProofBasis>,
    gathered: ProofBases,
}

impl Conjunction {
    fn new(conjuncts: Vec<Expression>) -> Self {
        let mut pending = VecDeque::new();
        let mut gathered = ProofBases::new();
        if conjuncts.is_empty() {
            gathered.insert(ProofBasis::empty());
        } else {
            pending.push_back(ProofBasis::empty());
        }
        Self {
            conjuncts,
            index: 0,
            pending,
            current: None,
            gathered,
        }
    }

    fn next_child(&mut self) -> Option<Expression> {
        loop {
            if let Some(inherited) = self.pending.pop_front() {
                let lemma = self.conjuncts[self.index].substitute(inherited.substitution());
                self.current = Some(inherited);
                return Some(lemma);
            }
            self.index += 1;
            if self.index >= self.conjuncts.len() || self.gathered.is_empty() {
                return None;
            }
            self.pending = std::mem::take(&mut self.gathered).into_iter().collect();
        }
    }

    fn receive(&mut self, bases: ProofBases) {
        let Some(inherited) = self.current.take() else {
            return;
        };
        for basis in &bases {
            self.gathered.insert(inherited.product(basis));
        }
    }
}

/// Built-in expansions for the logical connectives.
pub(crate) fn connectives(lemma: &Expression, fresh: &mut usize) -> Result<Vec<Expansion>> {
    let Some(word) = Logical::of(lemma) else {
        return Ok(Vec::new());
    };

    let expansions = match (word, lemma.argument(0), lemma.argument(1)) {
        (Logical::Truly, Some(inner), _) => vec![Expansion::rewrite(inner.clone())],
        (Logical::Not, Some(inner), _) => match Logical::of(inner) {
            Some(Logical::Not) => inner
                .argument(0)
                .map(|doubly| Expansion::rewrite(doubly.clone()))
                .into_iter()
                .collect(),
            Some(Logical::Identity) if lemma.is_ground() => {
                vec![Expansion::assumption(inner.clone(), lemma.clone())]
            }
            _ => Vec::new(),
        },
        (Logical::Or, Some(left), Some(right)) => vec![
            Expansion::rewrite(left.clone()),
            Expansion::rewrite(right.clone()),
        ],
        (Logical::And, Some(left), Some(right)) => {
            vec![Expansion::conjunction(vec![left.clone(), right.clone()])]
        }
        (Logical::Exists, Some(restrictor), Some(scope)) => {
            let witness = fresh_variable(restrictor, fresh)?;
            vec![Expansion::conjunction(vec![
                restrictor.apply(std::slice::from_ref(&witness))?,
                scope.apply(std::slice::from_ref(&witness))?,
            ])]
        }
        _ => Vec::new(),
    };
    Ok(expansions)
}

/// A variable of the predicate's input type that no caller-built variable equals.
fn fresh_variable(predicate: &Expression, fresh: &mut usize) -> Result<Expression> {
    let input = predicate
        .semantic_type()
        .inputs()
        .first()
        .cloned()
        .ok_or_else(|| NoesisError::Arity {
            expression: predicate.to_string(),
            open_slots: 0,
            supplied: 1,
        })?;
    *fresh += 1;
    Ok(Expression::word(Variable::fresh("_v", *fresh, input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use noesis_core::SemanticType;

    fn sentence(name: &str) -> Expression {
        Expression::constant(name, SemanticType::truth_value())
    }

    fn drain(expansion: &mut Expansion) -> Vec<Expression> {
        let mut children = Vec::new();
        while let Some(child) = expansion.next_child() {
            expansion.receive(ProofBases::single(ProofBasis::premise(child.clone())));
            children.push(child);
        }
        children
    }

    #[test]
    fn test_double_negation_rewrites() {
        let p = sentence("P");
        let lemma = Logical::Not
            .apply(&[Logical::Not.apply(&[p.clone()]).unwrap()])
            .unwrap();
        let mut fresh = 0;
        let mut expansions = connectives(&lemma, &mut fresh).unwrap();
        assert_eq!(expansions.len(), 1);
        assert_eq!(drain(&mut expansions[0]), vec![p]);
    }

    #[test]
    fn test_conjunction_products_in_order() {
        let (p, q) = (sentence("P"), sentence("Q"));
        let mut expansion = Expansion::conjunction(vec![p.clone(), q.clone()]);
        assert_eq!(drain(&mut expansion), vec![p.clone(), q.clone()]);

        let bases = expansion.finish();
        assert_eq!(bases.len(), 1);
        let basis = bases.iter().next().unwrap();
        assert_eq!(basis.premises(), &[p, q]);
    }

    #[test]
    fn test_conjunction_stops_at_failed_conjunct() {
        let mut expansion = Expansion::conjunction(vec![sentence("P"), sentence("Q")]);
        assert_eq!(expansion.next_child(), Some(sentence("P")));
        expansion.receive(ProofBases::new());
        assert_eq!(expansion.next_child(), None);
        assert!(expansion.finish().is_empty());
    }

    #[test]
    fn test_empty_conjunction_holds() {
        let mut expansion = Expansion::conjunction(Vec::new());
        assert_eq!(expansion.next_child(), None);
        assert_eq!(expansion.finish(), ProofBases::single(ProofBasis::empty()));
    }

    #[test]
    fn test_assumption_refuted_by_any_basis() {
        let a = Expression::constant("a", SemanticType::individual());
        let b = Expression::constant("b", SemanticType::individual());
        let probe = Logical::Identity.apply(&[a, b]).unwrap();
        let assumed = Logical::Not.apply(&[probe.clone()]).unwrap();

        let mut refuted = Expansion::assumption(probe.clone(), assumed.clone());
        assert!(refuted.is_probe());
        assert_eq!(refuted.next_child(), Some(probe.clone()));
        refuted.receive(ProofBases::single(ProofBasis::empty()));
        assert!(refuted.finish().is_empty());

        let mut accepted = Expansion::assumption(probe.clone(), assumed.clone());
        accepted.next_child();
        accepted.receive(ProofBases::new());
        assert_eq!(
            accepted.finish(),
            ProofBases::single(ProofBasis::premise(assumed))
        );
    }

    #[test]
    fn test_existential_introduces_fresh_witness() {
        let tomato = Expression::constant("TOMATO", SemanticType::predicate());
        let red = Expression::constant("RED", SemanticType::predicate());
        let lemma = Logical::Exists.apply(&[tomato, red]).unwrap();

        let mut fresh = 0;
        let mut expansions = connectives(&lemma, &mut fresh).unwrap();
        assert_eq!(fresh, 1);
        let children = drain(&mut expansions[0]);
        assert_eq!(children[0].to_string(), "TOMATO(_v1)");
        assert_eq!(children[1].to_string(), "RED(_v1)");
    }

    #[test]
    fn test_witness_never_captures_caller_variable() {
        let tomato = Expression::constant("TOMATO", SemanticType::predicate());
        let at = Expression::constant("AT", SemanticType::relation());
        let namesake = Expression::variable("_v1", SemanticType::individual());
        let near = at.apply(&[namesake.clone()]).unwrap();
        let lemma = Logical::Exists.apply(&[tomato, near]).unwrap();

        let mut fresh = 0;
        let mut expansions = connectives(&lemma, &mut fresh).unwrap();
        let children = drain(&mut expansions[0]);
        let witness = children[0].argument(0).unwrap();
        assert_ne!(witness, &namesake);
        assert!(witness.head().as_variable().unwrap().is_fresh());
        assert_eq!(children[1].variables().len(), 2);
    }
}
