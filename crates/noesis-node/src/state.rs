//! Application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use noesis_core::{Lexicon, Plan, Result};
use noesis_state::{Location, MentalStore};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::config::NodeConfig;

/// Percepts that may wait for the engine before senders are refused.
const PERCEPT_QUEUE: usize = 256;

/// An observation reported by a sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptReport {
    /// Name of the predicate observed to hold of the object.
    pub characteristic: String,

    /// Where the object is.
    pub location: Location,
}

/// A decided plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanRecord {
    pub id: Uuid,
    pub decided_at: DateTime<Utc>,

    /// Store generation the plan was decided against.
    pub generation: u64,

    pub plan: Plan,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Beliefs and desires. Written only by the engine between decisions.
    pub mind: Arc<RwLock<MentalStore>>,

    /// Known words.
    pub lexicon: Arc<RwLock<Lexicon>>,

    /// Percepts waiting for the engine.
    pub percepts: mpsc::Sender<PerceptReport>,

    /// The most recent decision.
    pub plan: Arc<RwLock<Option<PlanRecord>>>,

    pub config: Arc<NodeConfig>,
}

impl AppState {
    /// Create the state and the receiving end of the percept queue.
    pub fn new(config: NodeConfig) -> Result<(Self, mpsc::Receiver<PerceptReport>)> {
        let mut lexicon = Lexicon::new();
        lexicon.extend_from(&config.lexicon)?;
        let (percepts, receiver) = mpsc::channel(PERCEPT_QUEUE);

        let state = Self {
            mind: Arc::new(RwLock::new(MentalStore::new())),
            lexicon: Arc::new(RwLock::new(lexicon)),
            percepts,
            plan: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
        };
        Ok((state, receiver))
    }

    /// Publish a decided plan.
    pub async fn record_plan(&self, plan: Plan, generation: u64) -> PlanRecord {
        let record = PlanRecord {
            id: Uuid::new_v4(),
            decided_at: Utc::now(),
            generation,
            plan,
        };
        *self.plan.write().await = Some(record.clone());
        record
    }

    /// The most recent decision, if any.
    pub async fn current_plan(&self) -> Option<PlanRecord> {
        self.plan.read().await.clone()
    }
}
