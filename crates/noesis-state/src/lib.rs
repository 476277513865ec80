//! # Noesis State
//!
//! Belief and desire storage with copy-on-write snapshots.
//!
//! - [`MentalStore`] - The visual and evaluative bases and the percept registry
//! - [`BeliefView`] - A frozen view that searches read from

pub mod snapshot;
pub mod store;

pub use snapshot::{Base, BeliefView};
pub use store::{Location, MentalStore, PerceptRecord};
