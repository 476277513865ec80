//! Choosing the current plan from the agent's desires.

use std::collections::VecDeque;

use noesis_core::{Expression, NoesisError, Plan, Result};
use noesis_state::BeliefView;
use tracing::{debug, info};

use crate::clock::{TickClock, Unbounded};
use crate::planner::{Mode, PlannerConfig, Progress, Resumable};
use crate::search::ProofSearch;

#[derive(Debug, Clone)]
enum Stage {
    /// Pick the next desire.
    Next,
    /// Is the desire already satisfied?
    Proving(Expression, Box<ProofSearch>),
    /// Can the agent bring the desire about?
    Planning(Expression, Box<ProofSearch>),
    Finished,
}

/// A resumable decision of what to do next.
///
/// Desires are visited in canonical order. Desires that already hold are
/// skipped; the first one the agent can bring about yields the plan with the
/// fewest actions. With no such desire the plan is the no-op.
#[derive(Debug, Clone)]
pub struct PlanDecision {
    view: BeliefView,
    config: PlannerConfig,
    desires: VecDeque<Expression>,
    stage: Stage,
}

impl PlanDecision {
    /// Prepare a decision against a snapshot.
    pub fn new(view: BeliefView, config: PlannerConfig) -> Self {
        let desires = view.desires().cloned().collect();
        Self {
            view,
            config,
            desires,
            stage: Stage::Next,
        }
    }

    /// Run to completion without suspending.
    pub fn run(mut self) -> Result<Plan> {
        match self.resume(&Unbounded)? {
            Progress::Complete(plan) => Ok(plan),
            Progress::Suspended => Err(NoesisError::Internal(
                "unbounded decision suspended".to_string(),
            )),
        }
    }

    fn search(&self, desire: &Expression, mode: Mode) -> Result<Box<ProofSearch>> {
        ProofSearch::new(self.view.clone(), desire.clone(), mode, self.config.clone()).map(Box::new)
    }
}

impl Resumable for PlanDecision {
    type Output = Plan;

    fn resume(&mut self, clock: &dyn TickClock) -> Result<Progress<Plan>> {
        let budget = self.config.tick_budget();
        loop {
            match std::mem::replace(&mut self.stage, Stage::Finished) {
                Stage::Next => match self.desires.pop_front() {
                    Some(desire) => {
                        let search = self.search(&desire, Mode::Proof)?;
                        self.stage = Stage::Proving(desire, search);
                    }
                    None => {
                        info!("No desire admits a plan; doing nothing");
                        return Ok(Progress::Complete(Plan::no_op()));
                    }
                },
                Stage::Proving(desire, mut search) => match search.resume(clock)? {
                    Progress::Suspended => {
                        self.stage = Stage::Proving(desire, search);
                        return Ok(Progress::Suspended);
                    }
                    Progress::Complete(bases) if bases.is_empty() => {
                        let search = self.search(&desire, Mode::Plan)?;
                        self.stage = Stage::Planning(desire, search);
                    }
                    Progress::Complete(_) => {
                        debug!("Desire {} already holds", desire);
                        self.stage = Stage::Next;
                    }
                },
                Stage::Planning(desire, mut search) => match search.resume(clock)? {
                    Progress::Suspended => {
                        self.stage = Stage::Planning(desire, search);
                        return Ok(Progress::Suspended);
                    }
                    Progress::Complete(bases) => {
                        let simplest = bases.iter().map(|basis| basis.actions()).min_by_key(Vec::len);
                        match simplest {
                            Some(actions) => {
                                info!("Planned {} action(s) for {}", actions.len(), desire);
                                return Ok(Progress::Complete(Plan::new(desire, actions)));
                            }
                            None => {
                                debug!("No plan for {}", desire);
                                self.stage = Stage::Next;
                            }
                        }
                    }
                },
                Stage::Finished => return Err(NoesisError::SearchComplete),
            }

            if clock.elapsed() >= budget {
                return Ok(Progress::Suspended);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Exhausted;
    use noesis_core::{Logical, SemanticType};
    use noesis_state::MentalStore;

    fn individual(name: &str) -> Expression {
        Expression::constant(name, SemanticType::individual())
    }

    fn predicate(name: &str) -> Expression {
        Expression::constant(name, SemanticType::predicate())
    }

    #[test]
    fn test_satisfied_desire_is_skipped() {
        let clean = predicate("CLEAN").apply(&[individual("a")]).unwrap();
        let mut store = MentalStore::new();
        store.initialize(vec![clean.clone()], vec![clean]).unwrap();

        let plan = PlanDecision::new(store.view(), PlannerConfig::default())
            .run()
            .unwrap();
        assert!(plan.is_no_op());
    }

    #[test]
    fn test_ability_becomes_action() {
        let clean = predicate("CLEAN").apply(&[individual("a")]).unwrap();
        let able = Logical::Able
            .apply(&[Logical::Myself.word(), clean.clone()])
            .unwrap();
        let mut store = MentalStore::new();
        store.initialize(vec![able], vec![clean.clone()]).unwrap();

        let plan = PlanDecision::new(store.view(), PlannerConfig::default())
            .run()
            .unwrap();
        assert_eq!(plan.goal, Some(clean.clone()));
        assert_eq!(plan.actions, vec![Logical::Will.apply(&[clean]).unwrap()]);
    }

    #[test]
    fn test_fewest_actions_wins() {
        let (a, b) = (individual("a"), individual("b"));
        let clean_a = predicate("CLEAN").apply(&[a]).unwrap();
        let clean_b = predicate("CLEAN").apply(&[b]).unwrap();
        let both = Logical::And
            .apply(&[clean_a.clone(), clean_b.clone()])
            .unwrap();
        let either = Logical::Or.apply(&[both, clean_b.clone()]).unwrap();
        let able = |s: &Expression| {
            Logical::Able
                .apply(&[Logical::Myself.word(), s.clone()])
                .unwrap()
        };

        let mut store = MentalStore::new();
        store
            .initialize(vec![able(&clean_a), able(&clean_b)], vec![either])
            .unwrap();

        let plan = PlanDecision::new(store.view(), PlannerConfig::default())
            .run()
            .unwrap();
        assert_eq!(plan.actions, vec![Logical::Will.apply(&[clean_b]).unwrap()]);
    }

    #[test]
    fn test_decision_resumes_across_ticks() {
        let clean = predicate("CLEAN").apply(&[individual("a")]).unwrap();
        let able = Logical::Able
            .apply(&[Logical::Myself.word(), clean.clone()])
            .unwrap();
        let mut store = MentalStore::new();
        store.initialize(vec![able], vec![clean]).unwrap();

        let config = PlannerConfig::default();
        let expected = PlanDecision::new(store.view(), config.clone()).run().unwrap();

        let mut decision = PlanDecision::new(store.view(), config);
        let mut ticks = 0;
        let plan = loop {
            ticks += 1;
            if let Progress::Complete(plan) = decision.resume(&Exhausted).unwrap() {
                break plan;
            }
        };
        assert!(ticks > 1);
        assert_eq!(plan, expected);
        assert_eq!(decision.resume(&Exhausted), Err(NoesisError::SearchComplete));
    }
}
