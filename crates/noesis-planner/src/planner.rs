//! Reasoner trait and configuration.

use std::time::Duration;

use async_trait::async_trait;
use noesis_core::{Expression, Plan, ProofBases, Result};
use noesis_state::BeliefView;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{InstantClock, TickClock};
use crate::decide::PlanDecision;
use crate::search::ProofSearch;

/// How a search expands lemmas beyond the base case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionBackend {
    /// Built-in expansion per logical connective.
    Connectives,
    /// Interpret the inference rule table.
    RuleTable,
}

/// Configuration for the reasoner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Search time allowed per tick, in milliseconds.
    pub tick_budget_ms: u64,

    /// Pause between ticks when a reasoner drives a search itself.
    pub tick_interval_ms: u64,

    /// Hard ceiling on the iterative deepening bound.
    pub max_depth_bound: Option<usize>,

    /// Skip expanding a lemma equal to one of its ancestors.
    pub recurrence_guard: bool,

    /// Expansion strategy.
    pub backend: ExpansionBackend,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tick_budget_ms: 8,
            tick_interval_ms: 16,
            max_depth_bound: None,
            recurrence_guard: true,
            backend: ExpansionBackend::Connectives,
        }
    }
}

impl PlannerConfig {
    /// The per-tick budget as a duration.
    pub fn tick_budget(&self) -> Duration {
        Duration::from_millis(self.tick_budget_ms)
    }

    /// The pause between ticks as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// What a search is asked to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Justify the sentence from beliefs alone.
    Proof,
    /// Also allow the agent's own abilities, yielding planned actions.
    Plan,
}

/// Outcome of resuming a computation for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<T> {
    /// The tick budget ran out; resume again later.
    Suspended,
    /// The computation finished with this value.
    Complete(T),
}

impl<T> Progress<T> {
    /// Returns true if the computation finished.
    pub fn is_complete(&self) -> bool {
        matches!(self, Progress::Complete(_))
    }
}

/// A computation that runs a slice at a time.
pub trait Resumable {
    /// The final value.
    type Output;

    /// Run until finished or until `clock` reports the tick is over.
    ///
    /// Every call makes progress. Resuming after `Complete` was returned is
    /// an error.
    fn resume(&mut self, clock: &dyn TickClock) -> Result<Progress<Self::Output>>;
}

/// Trait for reasoning engines.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Find every justification of `goal` against `view`.
    async fn prove(&self, view: BeliefView, goal: Expression, mode: Mode) -> Result<ProofBases>;

    /// Choose what to do next.
    async fn decide_plan(&self, view: BeliefView) -> Result<Plan>;

    /// Get the reasoner configuration.
    fn config(&self) -> &PlannerConfig;

    /// Update the reasoner configuration.
    fn set_config(&mut self, config: PlannerConfig);
}

/// A reasoner that runs each request one tick at a time, sleeping between ticks.
#[derive(Debug, Clone, Default)]
pub struct TickedReasoner {
    config: PlannerConfig,
}

impl TickedReasoner {
    /// Create a reasoner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reasoner with custom configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    async fn drive<R>(&self, mut work: R) -> Result<R::Output>
    where
        R: Resumable + Send,
    {
        let mut clock = InstantClock::start();
        let mut ticks = 0u64;
        loop {
            clock.restart();
            ticks += 1;
            if let Progress::Complete(output) = work.resume(&clock)? {
                debug!("Reasoning finished after {} ticks", ticks);
                return Ok(output);
            }
            tokio::time::sleep(self.config.tick_interval()).await;
        }
    }
}

#[async_trait]
impl Reasoner for TickedReasoner {
    async fn prove(&self, view: BeliefView, goal: Expression, mode: Mode) -> Result<ProofBases> {
        let search = ProofSearch::new(view, goal, mode, self.config.clone())?;
        self.drive(search).await
    }

    async fn decide_plan(&self, view: BeliefView) -> Result<Plan> {
        self.drive(PlanDecision::new(view, self.config.clone())).await
    }

    fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn set_config(&mut self, config: PlannerConfig) {
        self.config = config;
    }
}
