//! Natural-deduction rule schemas and the backend that interprets them.

use std::collections::BTreeSet;

use noesis_core::{Expression, Logical, Result, SemanticType, Substitution, Variable};
use tracing::trace;

use crate::expand::Expansion;

/// A rule schema: from the premises, under the assumptions, infer the conclusions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRule {
    pub name: String,
    pub premises: Vec<Expression>,
    pub assumptions: Vec<Expression>,
    pub conclusions: Vec<Expression>,
}

impl InferenceRule {
    /// Create a rule.
    pub fn new(
        name: impl Into<String>,
        premises: Vec<Expression>,
        assumptions: Vec<Expression>,
        conclusions: Vec<Expression>,
    ) -> Self {
        Self {
            name: name.into(),
            premises,
            assumptions,
            conclusions,
        }
    }

    /// Contrapositive forms of the rule.
    ///
    /// For each conclusion `C` and premise `Pᵢ`: the other premises and
    /// `NOT(C)` yield `NOT(Pᵢ)`. Assumptions carry over.
    pub fn contrapositive(&self) -> Result<Vec<InferenceRule>> {
        let mut rules = Vec::new();
        for conclusion in &self.conclusions {
            let denied = Logical::Not.apply(std::slice::from_ref(conclusion))?;
            for (index, premise) in self.premises.iter().enumerate() {
                let mut premises: Vec<Expression> = self
                    .premises
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != index)
                    .map(|(_, other)| other.clone())
                    .collect();
                premises.push(denied.clone());
                rules.push(InferenceRule::new(
                    format!("{} contrapositive {}", self.name, index + 1),
                    premises,
                    self.assumptions.clone(),
                    vec![Logical::Not.apply(std::slice::from_ref(premise))?],
                ));
            }
        }
        Ok(rules)
    }

    /// Every schematic variable of the rule.
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.premises
            .iter()
            .chain(&self.assumptions)
            .chain(&self.conclusions)
            .flat_map(Expression::variables)
            .collect()
    }

    /// The rule with every variable renamed apart using `tag`.
    fn freshen(&self, tag: usize) -> Result<InferenceRule> {
        let mut renaming = Substitution::new();
        for variable in self.variables() {
            let renamed = Expression::word(Variable::fresh(
                &format!("{}'", variable.name()),
                tag,
                variable.semantic_type().clone(),
            ));
            renaming = renaming.bind(variable, renamed)?;
        }
        let apply = |items: &[Expression]| -> Vec<Expression> {
            items.iter().map(|item| item.substitute(&renaming)).collect()
        };
        Ok(InferenceRule {
            name: self.name.clone(),
            premises: apply(&self.premises),
            assumptions: apply(&self.assumptions),
            conclusions: apply(&self.conclusions),
        })
    }

    /// The standard rule table.
    pub fn standard() -> Result<Vec<InferenceRule>> {
        let x = Expression::variable("x", SemanticType::truth_value());
        let y = Expression::variable("y", SemanticType::truth_value());
        let a = Expression::variable("a", SemanticType::individual());
        let b = Expression::variable("b", SemanticType::individual());
        let f = Expression::variable("F", SemanticType::predicate());
        let g = Expression::variable("G", SemanticType::predicate());

        let truly_x = Logical::Truly.apply(&[x.clone()])?;
        let not_not_x = Logical::Not.apply(&[Logical::Not.apply(&[x.clone()])?])?;
        let x_and_y = Logical::And.apply(&[x.clone(), y.clone()])?;
        let x_or_y = Logical::Or.apply(&[x.clone(), y.clone()])?;
        let some_f_g = Logical::Exists.apply(&[f.clone(), g.clone()])?;
        let a_is_not_b =
            Logical::Not.apply(&[Logical::Identity.apply(&[a.clone(), b.clone()])?])?;

        Ok(vec![
            InferenceRule::new("truly introduction", vec![x.clone()], vec![], vec![truly_x.clone()]),
            InferenceRule::new("truly elimination", vec![truly_x], vec![], vec![x.clone()]),
            InferenceRule::new(
                "double negation introduction",
                vec![x.clone()],
                vec![],
                vec![not_not_x.clone()],
            ),
            InferenceRule::new(
                "double negation elimination",
                vec![not_not_x],
                vec![],
                vec![x.clone()],
            ),
            InferenceRule::new(
                "conjunction introduction",
                vec![x.clone(), y.clone()],
                vec![],
                vec![x_and_y.clone()],
            ),
            InferenceRule::new(
                "conjunction elimination",
                vec![x_and_y],
                vec![],
                vec![x.clone(), y.clone()],
            ),
            InferenceRule::new(
                "disjunction introduction left",
                vec![x.clone()],
                vec![],
                vec![x_or_y.clone()],
            ),
            InferenceRule::new(
                "disjunction introduction right",
                vec![y],
                vec![],
                vec![x_or_y],
            ),
            InferenceRule::new(
                "existential introduction",
                vec![f.apply(&[a.clone()])?, g.apply(&[a.clone()])?],
                vec![],
                vec![some_f_g],
            ),
            InferenceRule::new("nonidentity", vec![], vec![a_is_not_b.clone()], vec![a_is_not_b]),
        ])
    }
}

/// Expansions of `lemma` by backward chaining through `rules`.
///
/// Only rules whose conclusion is not a bare variable apply; elimination rules
/// would otherwise match every lemma. Assumption-free rules become rewrites or
/// conjunctions of their premises. A rule with a single assumption and no
/// premises becomes negation as failure, for ground lemmas only.
pub(crate) fn expansions(
    rules: &[InferenceRule],
    lemma: &Expression,
    fresh: &mut usize,
) -> Result<Vec<Expansion>> {
    let mut expansions = Vec::new();
    for rule in rules {
        if !rule.conclusions.iter().any(has_rigid_head) {
            continue;
        }
        *fresh += 1;
        let rule = rule.freshen(*fresh)?;

        for conclusion in rule.conclusions.iter().filter(|c| has_rigid_head(c)) {
            for unifier in conclusion.get_matches(lemma) {
                trace!("Rule '{}' concludes {}", rule.name, lemma);
                let premises: Vec<Expression> = rule
                    .premises
                    .iter()
                    .map(|premise| premise.substitute(&unifier))
                    .collect();

                if rule.assumptions.is_empty() {
                    let expansion = if premises.len() == 1 {
                        Expansion::rewrite(premises[0].clone())
                    } else {
                        Expansion::conjunction(premises)
                    };
                    expansions.push(expansion);
                } else if premises.is_empty() && rule.assumptions.len() == 1 && lemma.is_ground() {
                    let assumed = rule.assumptions[0].substitute(&unifier);
                    if let (Some(Logical::Not), Some(probe)) =
                        (Logical::of(&assumed), assumed.argument(0))
                    {
                        expansions.push(Expansion::assumption(probe.clone(), assumed.clone()));
                    }
                }
            }
        }
    }
    Ok(expansions)
}

fn has_rigid_head(conclusion: &Expression) -> bool {
    conclusion.head().as_variable().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noesis_core::{ProofBasis, ProofBases};

    fn sentence(name: &str) -> Expression {
        Expression::constant(name, SemanticType::truth_value())
    }

    #[test]
    fn test_standard_table() {
        let rules = InferenceRule::standard().unwrap();
        assert_eq!(rules.len(), 10);
        assert!(rules.iter().any(|rule| rule.name == "nonidentity"));
    }

    #[test]
    fn test_contrapositive() {
        let (p, q, r) = (sentence("P"), sentence("Q"), sentence("R"));
        let rule = InferenceRule::new("modus", vec![p.clone(), q.clone()], vec![], vec![r.clone()]);
        let contrapositives = rule.contrapositive().unwrap();
        assert_eq!(contrapositives.len(), 2);

        let not = |s: &Expression| Logical::Not.apply(&[s.clone()]).unwrap();
        assert_eq!(contrapositives[0].premises, vec![q.clone(), not(&r)]);
        assert_eq!(contrapositives[0].conclusions, vec![not(&p)]);
        assert_eq!(contrapositives[1].premises, vec![p, not(&r)]);
        assert_eq!(contrapositives[1].conclusions, vec![not(&q)]);
    }

    #[test]
    fn test_freshen_renames_apart() {
        let rules = InferenceRule::standard().unwrap();
        let fresh = rules[0].freshen(7).unwrap();
        assert_eq!(fresh.premises[0].to_string(), "x'7");
        assert_eq!(fresh.conclusions[0].to_string(), "TRULY(x'7)");
    }

    #[test]
    fn test_truly_lemma_rewrites_through_table() {
        let rules = InferenceRule::standard().unwrap();
        let p = sentence("P");
        let lemma = Logical::Truly.apply(&[p.clone()]).unwrap();

        let mut fresh = 0;
        let mut found = expansions(&rules, &lemma, &mut fresh).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].next_child(), Some(p));
    }

    #[test]
    fn test_existential_lemma_splits_into_conjunction() {
        let rules = InferenceRule::standard().unwrap();
        let tomato = Expression::constant("TOMATO", SemanticType::predicate());
        let red = Expression::constant("RED", SemanticType::predicate());
        let lemma = Logical::Exists.apply(&[tomato, red]).unwrap();

        let mut fresh = 0;
        let mut found = expansions(&rules, &lemma, &mut fresh).unwrap();
        assert_eq!(found.len(), 1);
        let first = found[0].next_child().unwrap();
        assert!(first.to_string().starts_with("TOMATO(a'"));
    }

    #[test]
    fn test_renamed_rule_variables_avoid_caller_namesakes() {
        let rules = InferenceRule::standard().unwrap();
        let tomato = Expression::constant("TOMATO", SemanticType::predicate());
        let at = Expression::constant("AT", SemanticType::relation());
        let namesake = Expression::variable("a'6", SemanticType::individual());
        let lemma = Logical::Exists
            .apply(&[tomato, at.apply(&[namesake.clone()]).unwrap()])
            .unwrap();

        let mut fresh = 0;
        let mut found = expansions(&rules, &lemma, &mut fresh).unwrap();
        assert_eq!(found.len(), 1);
        let first = found[0].next_child().unwrap();
        assert_eq!(first.to_string(), "TOMATO(a'6)");
        assert_ne!(first.argument(0), Some(&namesake));

        found[0].receive(ProofBases::single(ProofBasis::empty()));
        let second = found[0].next_child().unwrap();
        assert_eq!(second.variables().len(), 2);
    }
}
