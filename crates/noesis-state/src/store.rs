//! The mental store: what an agent believes and what it wants.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use noesis_core::{Constant, Expression, Logical, NoesisError, Result, SemanticType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::snapshot::BeliefView;

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Location {
    /// Create a location.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A perceived object and where it was seen.
#[derive(Debug, Clone, Serialize)]
pub struct PerceptRecord {
    /// The individual constant standing for the object.
    pub symbol: Expression,

    /// Where the object is.
    pub location: Location,

    /// When the object was first perceived.
    pub first_seen: DateTime<Utc>,
}

/// Visual and evaluative belief bases plus the percept registry.
///
/// Both bases are copy-on-write: a [`BeliefView`] taken with
/// [`MentalStore::view`] is unaffected by later assertions.
#[derive(Debug, Default)]
pub struct MentalStore {
    visual: Arc<BTreeSet<Expression>>,
    evaluative: Arc<BTreeSet<Expression>>,
    percepts: Vec<PerceptRecord>,
    next_parameter: u64,
    max_depth: usize,
    generation: u64,
    initialized: bool,
}

impl MentalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with beliefs and desires. May be called once.
    ///
    /// Nothing is stored unless every item is a sentence.
    pub fn initialize<B, D>(&mut self, visual: B, desires: D) -> Result<()>
    where
        B: IntoIterator<Item = Expression>,
        D: IntoIterator<Item = Expression>,
    {
        if self.initialized {
            return Err(NoesisError::AlreadyInitialized);
        }

        let visual: Vec<Expression> = visual.into_iter().collect();
        let desires: Vec<Expression> = desires.into_iter().collect();
        for sentence in visual.iter().chain(desires.iter()) {
            sentence.expect_sentence()?;
        }
        let evaluative = desires
            .into_iter()
            .map(desirable)
            .collect::<Result<Vec<_>>>()?;

        let visual_count = visual.len();
        let desire_count = evaluative.len();
        for sentence in visual {
            self.store_visual(sentence);
        }
        for sentence in evaluative {
            self.store_evaluative(sentence);
        }
        self.initialized = true;
        self.generation += 1;

        info!(
            beliefs = visual_count,
            desires = desire_count,
            max_depth = self.max_depth,
            "Mental store initialized"
        );
        Ok(())
    }

    /// Add a sentence to the visual base. Returns false if it was already there.
    pub fn assert_belief(&mut self, sentence: Expression) -> Result<bool> {
        sentence.expect_sentence()?;
        let added = self.store_visual(sentence);
        if added {
            self.generation += 1;
        }
        Ok(added)
    }

    /// Add a desire to the evaluative base. Returns false if it was already there.
    pub fn assert_desire(&mut self, sentence: Expression) -> Result<bool> {
        sentence.expect_sentence()?;
        let added = self.store_evaluative(desirable(sentence)?);
        if added {
            self.generation += 1;
        }
        Ok(added)
    }

    /// Record a perceived object and believe `characteristic` of it.
    ///
    /// An object at a location already on record reuses that record's
    /// symbol. Otherwise a fresh individual constant `p1`, `p2`, ... is
    /// minted. Returns the symbol.
    pub fn construct_percept(
        &mut self,
        characteristic: &Expression,
        location: Location,
    ) -> Result<Expression> {
        let existing = self
            .percepts
            .iter()
            .find(|record| record.location == location)
            .map(|record| record.symbol.clone());

        let (symbol, parameter) = match &existing {
            Some(symbol) => (symbol.clone(), self.next_parameter),
            None => {
                let (constant, parameter) = self.unused_parameter(characteristic);
                (Expression::word(constant), parameter)
            }
        };

        let sentence = characteristic.apply(std::slice::from_ref(&symbol))?;
        sentence.expect_sentence()?;

        if existing.is_none() {
            self.next_parameter = parameter;
            self.percepts.push(PerceptRecord {
                symbol: symbol.clone(),
                location,
                first_seen: Utc::now(),
            });
            debug!(symbol = %symbol, ?location, "New percept");
        }

        if self.store_visual(sentence) {
            self.generation += 1;
        }
        Ok(symbol)
    }

    /// The next numbered individual that neither `characteristic` nor any
    /// stored sentence mentions.
    fn unused_parameter(&self, characteristic: &Expression) -> (Constant, u64) {
        let mut parameter = self.next_parameter;
        loop {
            parameter += 1;
            let constant = Constant::new(format!("p{}", parameter), SemanticType::individual());
            let mentioned = self
                .visual
                .iter()
                .chain(self.evaluative.iter())
                .chain(std::iter::once(characteristic))
                .any(|sentence| sentence.mentions(&constant));
            if !mentioned {
                return (constant, parameter);
            }
        }
    }

    /// Take a snapshot of the current beliefs and desires.
    pub fn view(&self) -> BeliefView {
        BeliefView {
            visual: Arc::clone(&self.visual),
            evaluative: Arc::clone(&self.evaluative),
            max_depth: self.max_depth,
            generation: self.generation,
        }
    }

    /// Visual beliefs in canonical order.
    pub fn beliefs(&self) -> impl Iterator<Item = &Expression> {
        self.visual.iter()
    }

    /// Evaluative base entries, each of the form `GOOD(s)`.
    pub fn desires(&self) -> impl Iterator<Item = &Expression> {
        self.evaluative.iter()
    }

    /// Every percept on record, oldest first.
    pub fn percepts(&self) -> &[PerceptRecord] {
        &self.percepts
    }

    /// Deepest structural depth of any stored sentence.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Incremented on every change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true once [`MentalStore::initialize`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn store_visual(&mut self, sentence: Expression) -> bool {
        self.max_depth = self.max_depth.max(sentence.depth());
        if self.visual.contains(&sentence) {
            return false;
        }
        Arc::make_mut(&mut self.visual).insert(sentence)
    }

    fn store_evaluative(&mut self, sentence: Expression) -> bool {
        self.max_depth = self.max_depth.max(sentence.depth());
        if self.evaluative.contains(&sentence) {
            return false;
        }
        Arc::make_mut(&mut self.evaluative).insert(sentence)
    }
}

/// `GOOD(s)`, leaving already-wrapped desires alone.
fn desirable(sentence: Expression) -> Result<Expression> {
    if Logical::Good.heads(&sentence) {
        Ok(sentence)
    } else {
        Logical::Good.apply(&[sentence])
    }
}
