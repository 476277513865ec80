//! # Noesis Planner
//!
//! Iterative-deepening proof search and planning-as-proof.
//!
//! - [`ProofSearch`] - Finds every justification of a sentence, a tick at a time
//! - [`PlanDecision`] - Picks the simplest plan for the first achievable desire
//! - [`Scheduler`] - Interleaves several searches and reports through oneshot channels
//! - [`Reasoner`] - Async front end that drives searches across ticks

pub mod clock;
pub mod decide;
mod expand;
pub mod planner;
pub mod rules;
pub mod scheduler;
pub mod search;

pub use clock::{Exhausted, InstantClock, TickClock, Unbounded};
pub use decide::PlanDecision;
pub use planner::{
    ExpansionBackend, Mode, PlannerConfig, Progress, Reasoner, Resumable, TickedReasoner,
};
pub use rules::InferenceRule;
pub use scheduler::Scheduler;
pub use search::ProofSearch;
