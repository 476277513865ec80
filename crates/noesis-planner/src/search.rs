//! Resumable iterative-deepening proof search.
//!
//! The search tree is walked depth-first with an explicit stack of nodes. The
//! nodes below the top of the stack are exactly the ancestors of the top node,
//! each waiting on its active [`Expansion`] for the child above it. Because the
//! whole continuation lives in the stack, the search can stop after any step
//! and pick up again on the next tick.

use std::collections::VecDeque;
use std::ops::Bound;

use noesis_core::{Expression, Logical, NoesisError, ProofBasis, ProofBases, Result};
use noesis_state::{Base, BeliefView};
use tracing::{debug, info, trace, warn};

use crate::clock::{TickClock, Unbounded};
use crate::expand::{self, Expansion};
use crate::planner::{ExpansionBackend, Mode, PlannerConfig, Progress, Resumable};
use crate::rules::{self, InferenceRule};

/// Where a node is in its own work.
#[derive(Debug, Clone)]
enum Phase {
    /// Check the lemma against the belief bases.
    Base,
    /// Walk the candidates of an open lemma, one per step.
    Matching {
        base: Base,
        lower: Expression,
        upper: Expression,
        cursor: Option<Expression>,
    },
    /// Decide which expansions apply.
    Expand,
    /// Run expansions one child at a time.
    Working,
    /// Hand the bases to the parent.
    Done,
}

#[derive(Debug, Clone)]
struct Node {
    lemma: Expression,
    depth: usize,
    probe: bool,
    phase: Phase,
    bases: ProofBases,
    expansions: VecDeque<Expansion>,
    active: Option<Expansion>,
}

impl Node {
    fn new(lemma: Expression, depth: usize, probe: bool) -> Self {
        Self {
            lemma,
            depth,
            probe,
            phase: Phase::Base,
            bases: ProofBases::new(),
            expansions: VecDeque::new(),
            active: None,
        }
    }
}

/// A resumable search for every justification of one sentence.
#[derive(Debug, Clone)]
pub struct ProofSearch {
    view: BeliefView,
    goal: Expression,
    mode: Mode,
    config: PlannerConfig,
    rules: Vec<InferenceRule>,
    bound: usize,
    reached: usize,
    stack: Vec<Node>,
    results: ProofBases,
    fresh: usize,
    steps: u64,
    finished: bool,
}

impl ProofSearch {
    /// Prepare a search for `goal` against a snapshot.
    ///
    /// Fails if `goal` is not a sentence.
    pub fn new(view: BeliefView, goal: Expression, mode: Mode, config: PlannerConfig) -> Result<Self> {
        let rules = match config.backend {
            ExpansionBackend::Connectives => Vec::new(),
            ExpansionBackend::RuleTable => InferenceRule::standard()?,
        };
        Self::build(view, goal, mode, config, rules)
    }

    /// Prepare a search that expands lemmas through a caller-supplied rule table.
    pub fn with_rules(
        view: BeliefView,
        goal: Expression,
        mode: Mode,
        mut config: PlannerConfig,
        rules: Vec<InferenceRule>,
    ) -> Result<Self> {
        config.backend = ExpansionBackend::RuleTable;
        Self::build(view, goal, mode, config, rules)
    }

    fn build(
        view: BeliefView,
        goal: Expression,
        mode: Mode,
        config: PlannerConfig,
        rules: Vec<InferenceRule>,
    ) -> Result<Self> {
        goal.expect_sentence()?;
        debug!("Searching for {} in {:?} mode", goal, mode);
        Ok(Self {
            stack: vec![Node::new(goal.clone(), 0, false)],
            view,
            goal,
            mode,
            config,
            rules,
            bound: 0,
            reached: 0,
            results: ProofBases::new(),
            fresh: 0,
            steps: 0,
            finished: false,
        })
    }

    /// The sentence being searched for.
    pub fn goal(&self) -> &Expression {
        &self.goal
    }

    /// The search mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The current iterative deepening bound.
    pub fn bound(&self) -> usize {
        self.bound
    }

    /// Returns true once the result has been delivered.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run to completion without suspending.
    pub fn run(mut self) -> Result<ProofBases> {
        match self.resume(&Unbounded)? {
            Progress::Complete(bases) => Ok(bases),
            Progress::Suspended => Err(NoesisError::Internal(
                "unbounded search suspended".to_string(),
            )),
        }
    }

    /// One unit of work. Returns the result once the search is exhaustive.
    fn step(&mut self) -> Result<Option<ProofBases>> {
        self.steps += 1;
        let Some(node) = self.stack.last_mut() else {
            return Ok(self.finish_pass());
        };

        let phase = std::mem::replace(&mut node.phase, Phase::Done);
        let phase = if node.probe && !node.bases.is_empty() {
            Phase::Done
        } else {
            phase
        };

        match phase {
            Phase::Base => self.base_case()?,
            Phase::Matching {
                base,
                lower,
                upper,
                cursor,
            } => self.match_next(base, lower, upper, cursor)?,
            Phase::Expand => self.expand()?,
            Phase::Working => self.work()?,
            Phase::Done => self.complete_node()?,
        }
        Ok(None)
    }

    fn base_case(&mut self) -> Result<()> {
        let node = top(&mut self.stack)?;
        if node.lemma.is_ground() {
            for basis in ground_bases(&self.view, &node.lemma)? {
                node.bases.insert(basis);
            }
            node.phase = Phase::Expand;
        } else {
            let (lower, upper) = node.lemma.range_bounds();
            node.phase = Phase::Matching {
                base: Base::for_sentence(&node.lemma),
                lower,
                upper,
                cursor: None,
            };
        }
        Ok(())
    }

    fn match_next(
        &mut self,
        base: Base,
        lower: Expression,
        upper: Expression,
        cursor: Option<Expression>,
    ) -> Result<()> {
        let node = top(&mut self.stack)?;
        let from = match &cursor {
            Some(previous) => Bound::Excluded(previous),
            None => Bound::Included(&lower),
        };
        let Some(candidate) = self.view.next_candidate(base, from, &upper).cloned() else {
            node.phase = Phase::Expand;
            return Ok(());
        };

        for unifier in node.lemma.get_matches(&candidate) {
            trace!("{} matches {} with {}", node.lemma, candidate, unifier);
            let premise = match base {
                Base::Visual => Logical::See.apply(std::slice::from_ref(&candidate))?,
                Base::Evaluative => candidate.clone(),
            };
            node.bases.insert(ProofBasis::new(vec![premise], unifier));
        }
        node.phase = Phase::Matching {
            base,
            lower,
            upper,
            cursor: Some(candidate),
        };
        Ok(())
    }

    fn expand(&mut self) -> Result<()> {
        let Some((node, ancestors)) = self.stack.split_last_mut() else {
            return Err(empty_stack());
        };
        node.phase = Phase::Working;
        if node.depth >= self.bound {
            return Ok(());
        }
        if self.config.recurrence_guard
            && ancestors.iter().any(|ancestor| ancestor.lemma == node.lemma)
        {
            debug!("Recurrent lemma {} at depth {}", node.lemma, node.depth);
            return Ok(());
        }

        let mut expansions = match self.config.backend {
            ExpansionBackend::Connectives => expand::connectives(&node.lemma, &mut self.fresh)?,
            ExpansionBackend::RuleTable => {
                rules::expansions(&self.rules, &node.lemma, &mut self.fresh)?
            }
        };
        if self.mode == Mode::Plan && node.lemma.depth() <= self.view.max_depth() {
            expansions.push(Expansion::ability(&node.lemma)?);
        }
        if !expansions.is_empty() {
            trace!("Expanding {} {} way(s)", node.lemma, expansions.len());
        }
        node.expansions = expansions.into();
        Ok(())
    }

    fn work(&mut self) -> Result<()> {
        let node = top(&mut self.stack)?;
        node.phase = Phase::Working;
        if node.active.is_none() {
            node.active = node.expansions.pop_front();
        }
        let Some(expansion) = node.active.as_mut() else {
            node.phase = Phase::Done;
            return Ok(());
        };

        match expansion.next_child() {
            Some(lemma) => {
                let child = Node::new(lemma, node.depth + 1, expansion.is_probe());
                self.reached = self.reached.max(child.depth);
                self.stack.push(child);
            }
            None => {
                if let Some(finished) = node.active.take() {
                    node.bases.join(finished.finish());
                }
            }
        }
        Ok(())
    }

    fn complete_node(&mut self) -> Result<()> {
        let node = self.stack.pop().ok_or_else(empty_stack)?;
        let bases = node.bases.restrict(&node.lemma.variables());
        trace!(
            "{} at depth {} has {} basis/bases",
            node.lemma,
            node.depth,
            bases.len()
        );

        match self.stack.last_mut() {
            Some(parent) => parent
                .active
                .as_mut()
                .ok_or_else(|| NoesisError::Internal("parent awaits no child".to_string()))?
                .receive(bases),
            None => self.results = bases,
        }
        Ok(())
    }

    /// Stop, or widen the bound and search again.
    fn finish_pass(&mut self) -> Option<ProofBases> {
        let exhaustive = self.reached < self.bound;
        let ceiling = self
            .config
            .max_depth_bound
            .is_some_and(|ceiling| self.bound >= ceiling);

        if exhaustive || ceiling {
            if !exhaustive {
                warn!(
                    "Search for {} stopped at depth ceiling {} before exhausting",
                    self.goal, self.bound
                );
            }
            info!(
                "Search for {} complete: {} basis/bases, bound {}, {} steps",
                self.goal,
                self.results.len(),
                self.bound,
                self.steps
            );
            return Some(std::mem::take(&mut self.results));
        }

        self.bound += 1;
        self.reached = 0;
        self.fresh = 0;
        self.results.clear();
        self.stack.push(Node::new(self.goal.clone(), 0, false));
        debug!("Widening search for {} to bound {}", self.goal, self.bound);
        None
    }
}

impl Resumable for ProofSearch {
    type Output = ProofBases;

    fn resume(&mut self, clock: &dyn TickClock) -> Result<Progress<ProofBases>> {
        if self.finished {
            return Err(NoesisError::SearchComplete);
        }
        let budget = self.config.tick_budget();
        loop {
            if let Some(bases) = self.step()? {
                self.finished = true;
                return Ok(Progress::Complete(bases));
            }
            if clock.elapsed() >= budget {
                return Ok(Progress::Suspended);
            }
        }
    }
}

/// Bases for a ground lemma straight from the belief bases.
fn ground_bases(view: &BeliefView, lemma: &Expression) -> Result<Vec<ProofBasis>> {
    let mut bases = Vec::new();
    if view.contains(Base::Visual, lemma) {
        bases.push(ProofBasis::premise(
            Logical::See.apply(std::slice::from_ref(lemma))?,
        ));
    }
    if Logical::Good.heads(lemma) && view.contains(Base::Evaluative, lemma) {
        bases.push(ProofBasis::premise(lemma.clone()));
    }
    if can_speak(lemma) || is_reflexive_identity(lemma) {
        bases.push(ProofBasis::empty());
    }
    Ok(bases)
}

/// `ABLE(SELF, SAY(SELF, s))`: the agent can always say things.
fn can_speak(lemma: &Expression) -> bool {
    let myself = Logical::Myself.word();
    Logical::Able.heads(lemma)
        && lemma.argument(0) == Some(&myself)
        && lemma.argument(1).is_some_and(|said| {
            Logical::Say.heads(said) && said.argument(0) == Some(&myself)
        })
}

/// `IDENTITY(a, a)`.
fn is_reflexive_identity(lemma: &Expression) -> bool {
    Logical::Identity.heads(lemma)
        && lemma.argument(0).is_some()
        && lemma.argument(0) == lemma.argument(1)
}

fn top(stack: &mut [Node]) -> Result<&mut Node> {
    stack.last_mut().ok_or_else(empty_stack)
}

fn empty_stack() -> NoesisError {
    NoesisError::Internal("search stack is empty".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Exhausted;
    use noesis_core::SemanticType;
    use noesis_state::MentalStore;

    fn individual(name: &str) -> Expression {
        Expression::constant(name, SemanticType::individual())
    }

    fn predicate(name: &str) -> Expression {
        Expression::constant(name, SemanticType::predicate())
    }

    fn view_of(beliefs: Vec<Expression>) -> BeliefView {
        let mut store = MentalStore::new();
        store.initialize(beliefs, Vec::<Expression>::new()).unwrap();
        store.view()
    }

    fn prove(view: &BeliefView, goal: Expression, mode: Mode) -> ProofBases {
        ProofSearch::new(view.clone(), goal, mode, PlannerConfig::default())
            .unwrap()
            .run()
            .unwrap()
    }

    #[test]
    fn test_rejects_non_sentence_goal() {
        let result = ProofSearch::new(
            BeliefView::empty(),
            predicate("TOMATO"),
            Mode::Proof,
            PlannerConfig::default(),
        );
        assert!(matches!(result, Err(NoesisError::NotASentence { .. })));
    }

    #[test]
    fn test_disjunction_collects_both_alternatives() {
        let red = predicate("RED").apply(&[individual("a")]).unwrap();
        let blue = predicate("BLUE").apply(&[individual("a")]).unwrap();
        let view = view_of(vec![red.clone(), blue.clone()]);

        let goal = Logical::Or.apply(&[red.clone(), blue.clone()]).unwrap();
        let bases = prove(&view, goal, Mode::Proof);
        assert_eq!(bases.len(), 2);
        assert!(bases.contains(&ProofBasis::premise(Logical::See.apply(&[red]).unwrap())));
        assert!(bases.contains(&ProofBasis::premise(Logical::See.apply(&[blue]).unwrap())));
    }

    #[test]
    fn test_truly_and_double_negation() {
        let red = predicate("RED").apply(&[individual("a")]).unwrap();
        let view = view_of(vec![red.clone()]);
        let seen = ProofBasis::premise(Logical::See.apply(&[red.clone()]).unwrap());

        let truly = Logical::Truly.apply(&[red.clone()]).unwrap();
        assert_eq!(prove(&view, truly, Mode::Proof), ProofBases::single(seen.clone()));

        let not_not = Logical::Not
            .apply(&[Logical::Not.apply(&[red]).unwrap()])
            .unwrap();
        assert_eq!(prove(&view, not_not, Mode::Proof), ProofBases::single(seen));
    }

    #[test]
    fn test_open_lemma_binds_each_instance() {
        let view = view_of(vec![
            predicate("RED").apply(&[individual("a")]).unwrap(),
            predicate("RED").apply(&[individual("b")]).unwrap(),
        ]);
        let x = Expression::variable("x", SemanticType::individual());
        let goal = predicate("RED").apply(&[x]).unwrap();

        let bases = prove(&view, goal, Mode::Proof);
        let bound: Vec<String> = bases
            .iter()
            .map(|basis| basis.substitution().to_string())
            .collect();
        assert_eq!(bound, vec!["{x ↦ a}", "{x ↦ b}"]);
    }

    #[test]
    fn test_existential_keeps_caller_variable_named_like_a_witness() {
        let (p1, p2) = (individual("p1"), individual("p2"));
        let at = Expression::constant("AT", SemanticType::relation());
        let view = view_of(vec![
            predicate("TOMATO").apply(&[p1.clone()]).unwrap(),
            at.apply(&[p2, p1]).unwrap(),
        ]);
        let namesake = Expression::variable("_v1", SemanticType::individual());
        let goal = Logical::Exists
            .apply(&[predicate("TOMATO"), at.apply(&[namesake]).unwrap()])
            .unwrap();

        let bases = prove(&view, goal, Mode::Proof);
        let bound: Vec<String> = bases
            .iter()
            .map(|basis| basis.substitution().to_string())
            .collect();
        assert_eq!(bound, vec!["{_v1 ↦ p2}"]);
    }

    #[test]
    fn test_recurrence_guard_cuts_cycles() {
        let x = Expression::variable("x", SemanticType::truth_value());
        let y = Expression::variable("y", SemanticType::truth_value());
        let commute = InferenceRule::new(
            "conjunction commutes",
            vec![Logical::And.apply(&[y.clone(), x.clone()]).unwrap()],
            vec![],
            vec![Logical::And.apply(&[x, y]).unwrap()],
        );
        let mut rules = InferenceRule::standard().unwrap();
        rules.push(commute);

        let red = predicate("RED").apply(&[individual("a")]).unwrap();
        let blue = predicate("BLUE").apply(&[individual("a")]).unwrap();
        let view = view_of(vec![red.clone(), blue.clone()]);
        let goal = Logical::And.apply(&[red.clone(), blue.clone()]).unwrap();

        let search = |config: PlannerConfig| {
            ProofSearch::with_rules(view.clone(), goal.clone(), Mode::Proof, config, rules.clone())
                .unwrap()
                .run()
                .unwrap()
        };
        let guarded = search(PlannerConfig::default());
        let unguarded = search(PlannerConfig {
            recurrence_guard: false,
            max_depth_bound: Some(6),
            ..PlannerConfig::default()
        });

        let see = |s: &Expression| Logical::See.apply(&[s.clone()]).unwrap();
        assert_eq!(guarded.len(), 2);
        assert!(guarded.contains(&ProofBasis::new(
            vec![see(&red), see(&blue)],
            Default::default()
        )));
        assert!(guarded.contains(&ProofBasis::new(
            vec![see(&blue), see(&red)],
            Default::default()
        )));
        assert_eq!(guarded, unguarded);
    }

    #[test]
    fn test_recurrence_guard_stops_widening() {
        let x = Expression::variable("x", SemanticType::truth_value());
        let y = Expression::variable("y", SemanticType::truth_value());
        let commute = InferenceRule::new(
            "conjunction commutes",
            vec![Logical::And.apply(&[y.clone(), x.clone()]).unwrap()],
            vec![],
            vec![Logical::And.apply(&[x, y]).unwrap()],
        );
        let red = predicate("RED").apply(&[individual("a")]).unwrap();
        let blue = predicate("BLUE").apply(&[individual("a")]).unwrap();
        let goal = Logical::And.apply(&[red, blue]).unwrap();

        let mut guarded = ProofSearch::with_rules(
            BeliefView::empty(),
            goal.clone(),
            Mode::Proof,
            PlannerConfig::default(),
            vec![commute.clone()],
        )
        .unwrap();
        let mut ticks = 0;
        while !guarded.resume(&Exhausted).unwrap().is_complete() {
            ticks += 1;
        }
        assert!(guarded.bound() <= 3);

        let mut unguarded = ProofSearch::with_rules(
            BeliefView::empty(),
            goal,
            Mode::Proof,
            PlannerConfig {
                recurrence_guard: false,
                ..PlannerConfig::default()
            },
            vec![commute],
        )
        .unwrap();
        for _ in 0..ticks * 10 {
            assert!(!unguarded.resume(&Exhausted).unwrap().is_complete());
        }
        assert!(unguarded.bound() > guarded.bound());
    }

    #[test]
    fn test_nonidentity_by_failure() {
        let view = BeliefView::empty();
        let (a, b) = (individual("a"), individual("b"));
        let distinct = Logical::Not
            .apply(&[Logical::Identity.apply(&[a.clone(), b]).unwrap()])
            .unwrap();
        let bases = prove(&view, distinct.clone(), Mode::Proof);
        assert_eq!(bases, ProofBases::single(ProofBasis::premise(distinct)));

        let same = Logical::Not
            .apply(&[Logical::Identity.apply(&[a.clone(), a]).unwrap()])
            .unwrap();
        assert!(prove(&view, same, Mode::Proof).is_empty());
    }

    #[test]
    fn test_self_can_speak() {
        let red = predicate("RED").apply(&[individual("a")]).unwrap();
        let said = Logical::Say
            .apply(&[Logical::Myself.word(), red])
            .unwrap();
        let goal = Logical::Able
            .apply(&[Logical::Myself.word(), said])
            .unwrap();
        let bases = prove(&BeliefView::empty(), goal, Mode::Proof);
        assert_eq!(bases, ProofBases::single(ProofBasis::empty()));
    }

    #[test]
    fn test_resume_after_completion_is_an_error() {
        let mut search = ProofSearch::new(
            BeliefView::empty(),
            predicate("RED").apply(&[individual("a")]).unwrap(),
            Mode::Proof,
            PlannerConfig::default(),
        )
        .unwrap();

        let mut ticks = 0;
        while !search.resume(&Exhausted).unwrap().is_complete() {
            ticks += 1;
        }
        assert!(ticks > 0);
        assert!(search.is_finished());
        assert_eq!(search.resume(&Exhausted), Err(NoesisError::SearchComplete));
    }

    #[test]
    fn test_depth_ceiling_stops_widening() {
        let red = predicate("RED").apply(&[individual("a")]).unwrap();
        let view = view_of(vec![red.clone()]);
        let goal = Logical::Truly.apply(&[red]).unwrap();
        let config = PlannerConfig {
            max_depth_bound: Some(0),
            ..PlannerConfig::default()
        };

        let bases = ProofSearch::new(view, goal, Mode::Proof, config)
            .unwrap()
            .run()
            .unwrap();
        assert!(bases.is_empty());
    }
}
