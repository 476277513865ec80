//! The agent's tick loop.

use noesis_planner::{InstantClock, PlanDecision, Progress, Resumable};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, PerceptReport};

/// Drives plan decisions a tick at a time.
///
/// Queued percepts are written to the mind only while no decision is in
/// flight, so a decision always sees one unchanging snapshot.
pub struct Engine {
    state: AppState,
    percepts: mpsc::Receiver<PerceptReport>,
    decision: Option<PlanDecision>,
    deciding: u64,
    decided: Option<u64>,
}

impl Engine {
    /// Create a new engine.
    pub fn new(state: AppState, percepts: mpsc::Receiver<PerceptReport>) -> Self {
        Self {
            state,
            percepts,
            decision: None,
            deciding: 0,
            decided: None,
        }
    }

    /// Run the engine's main loop.
    pub async fn run(mut self) {
        info!("Engine started");
        let mut ticker = interval(self.state.config.planner.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// One tick: absorb percepts if idle, then advance the current decision.
    pub async fn tick(&mut self) {
        if self.decision.is_none() {
            self.apply_percepts().await;

            let view = self.state.mind.read().await.view();
            if self.decided == Some(view.generation()) {
                return;
            }
            debug!("Deciding plan at generation {}", view.generation());
            self.deciding = view.generation();
            self.decision = Some(PlanDecision::new(view, self.state.config.planner.clone()));
        }

        let Some(decision) = self.decision.as_mut() else {
            return;
        };
        let progress = decision.resume(&InstantClock::start());
        match progress {
            Ok(Progress::Suspended) => {}
            Ok(Progress::Complete(plan)) => {
                self.decision = None;
                self.decided = Some(self.deciding);
                let record = self.state.record_plan(plan, self.deciding).await;
                info!(
                    "Plan {} decided: {} action(s)",
                    record.id,
                    record.plan.actions.len()
                );
            }
            Err(e) => {
                error!("Plan decision failed: {}", e);
                self.decision = None;
                self.decided = Some(self.deciding);
            }
        }
    }

    async fn apply_percepts(&mut self) {
        while let Ok(report) = self.percepts.try_recv() {
            if let Err(e) = self.apply(&report).await {
                warn!("Dropping percept {}: {}", report.characteristic, e);
            }
        }
    }

    async fn apply(&self, report: &PerceptReport) -> noesis_core::Result<()> {
        let characteristic = self.state.lexicon.read().await.word(&report.characteristic)?;
        let symbol = self
            .state
            .mind
            .write()
            .await
            .construct_percept(&characteristic, report.location)?;
        debug!("Percept {} is {}", symbol, report.characteristic);
        Ok(())
    }

    /// Returns true while a decision is in flight.
    #[cfg(test)]
    pub fn is_deciding(&self) -> bool {
        self.decision.is_some()
    }
}
