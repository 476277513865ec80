//! Matching schematic expressions against candidates.
//!
//! Variables of the pattern are bound; variables of the candidate are rigid.
//! A variable heading an application may absorb part of the candidate: for
//! `F(p1)` against `AT(SELF, p1)` the match binds `F ↦ AT(SELF, _)`.

use std::collections::BTreeSet;

use crate::expression::{Argument, Expression, Variable};
use crate::substitution::Substitution;

impl Expression {
    /// Every substitution `σ` such that `self.substitute(σ) == candidate`.
    ///
    /// An empty result means the expressions do not match.
    pub fn get_matches(&self, candidate: &Expression) -> Vec<Substitution> {
        let found: BTreeSet<Substitution> =
            match_expression(self, candidate, Substitution::new())
                .into_iter()
                .collect();
        found.into_iter().collect()
    }

    /// Returns true if the pattern matches the candidate at least once.
    pub fn matches(&self, candidate: &Expression) -> bool {
        !match_expression(self, candidate, Substitution::new()).is_empty()
    }
}

fn match_expression(
    pattern: &Expression,
    candidate: &Expression,
    bindings: Substitution,
) -> Vec<Substitution> {
    if pattern.semantic_type() != candidate.semantic_type() {
        return Vec::new();
    }

    let Some(variable) = pattern.head().as_variable() else {
        return match_rigid(pattern, candidate, bindings);
    };

    match bindings.get(variable).cloned() {
        Some(value) if value.head() != pattern.head() => {
            let mut own = Substitution::new();
            own.insert_unchecked(variable.clone(), value);
            let instantiated = pattern.substitute(&own);
            match_expression(&instantiated, candidate, bindings)
        }
        Some(_) => match_rigid(pattern, candidate, bindings),
        None => match_variable_head(variable, pattern, candidate, bindings),
    }
}

fn match_rigid(
    pattern: &Expression,
    candidate: &Expression,
    bindings: Substitution,
) -> Vec<Substitution> {
    if pattern.head() != candidate.head()
        || pattern.arguments().len() != candidate.arguments().len()
    {
        return Vec::new();
    }
    match_arguments(
        pattern.arguments().iter().zip(candidate.arguments()),
        bindings,
    )
}

fn match_variable_head(
    variable: &Variable,
    pattern: &Expression,
    candidate: &Expression,
    bindings: Substitution,
) -> Vec<Substitution> {
    let slots = pattern.arguments();
    if slots.is_empty() {
        return vec![bind(bindings, variable, candidate.clone())];
    }

    let inputs = variable.semantic_type().inputs();
    let mut results = Vec::new();

    for positions in combinations(candidate.arguments().len(), slots.len()) {
        let mut value_arguments = candidate.arguments().to_vec();
        let well_typed = positions.iter().enumerate().all(|(slot, &position)| {
            candidate.arguments()[position].semantic_type() == &inputs[slot]
        });
        if !well_typed {
            continue;
        }
        for &position in &positions {
            let slot_type = candidate.arguments()[position].semantic_type().clone();
            value_arguments[position] = Argument::Empty(slot_type);
        }

        let value = Expression::assemble(candidate.head().clone(), value_arguments);
        if value.semantic_type() != variable.semantic_type() {
            continue;
        }

        let bound = bind(bindings.clone(), variable, value);
        let pairs = slots
            .iter()
            .zip(positions.iter().map(|&position| &candidate.arguments()[position]));
        results.extend(match_arguments(pairs, bound));
    }

    results
}

fn match_arguments<'a, I>(pairs: I, bindings: Substitution) -> Vec<Substitution>
where
    I: IntoIterator<Item = (&'a Argument, &'a Argument)>,
{
    let mut frontier = vec![bindings];
    for (pattern, candidate) in pairs {
        frontier = frontier
            .into_iter()
            .flat_map(|bindings| match_argument(pattern, candidate, bindings))
            .collect();
        if frontier.is_empty() {
            break;
        }
    }
    frontier
}

fn match_argument(
    pattern: &Argument,
    candidate: &Argument,
    bindings: Substitution,
) -> Vec<Substitution> {
    match (pattern, candidate) {
        (Argument::Empty(a), Argument::Empty(b)) if a == b => vec![bindings],
        (Argument::Expression(pattern), Argument::Expression(candidate)) => {
            match_expression(pattern, candidate, bindings)
        }
        _ => Vec::new(),
    }
}

/// Bind unless the value is the variable itself.
fn bind(mut bindings: Substitution, variable: &Variable, value: Expression) -> Substitution {
    if value != Expression::word(variable.clone()) {
        bindings.insert_unchecked(variable.clone(), value);
    }
    bindings
}

/// Increasing index tuples of length `k` drawn from `0..n`.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    fn extend(start: usize, n: usize, k: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for index in start..n {
            current.push(index);
            extend(index + 1, n, k, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    if k <= n {
        extend(0, n, k, &mut Vec::with_capacity(k), &mut out);
    }
    out
}
