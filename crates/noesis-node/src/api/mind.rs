//! Belief, desire and percept endpoints.

use axum::{extract::State, http::StatusCode, Json};
use noesis_core::{Expression, NoesisError, SemanticType};
use noesis_state::{Base, Location, PerceptRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error_response;
use crate::state::{AppState, PerceptReport};

/// Sentences of one belief base.
#[derive(Debug, Serialize)]
pub struct SentencesResponse {
    pub generation: u64,
    pub sentences: Vec<Expression>,
}

/// Request to report a percept.
#[derive(Debug, Deserialize)]
pub struct PerceptRequest {
    /// Name of a predicate in the lexicon.
    pub characteristic: String,
    pub location: Location,
}

/// Response after queueing a percept.
#[derive(Debug, Serialize)]
pub struct PerceptAccepted {
    pub status: String,
    pub characteristic: String,
}

/// List visual beliefs.
pub async fn list_beliefs(State(state): State<AppState>) -> Json<SentencesResponse> {
    let view = state.mind.read().await.view();
    Json(SentencesResponse {
        generation: view.generation(),
        sentences: view.base(Base::Visual).iter().cloned().collect(),
    })
}

/// List desires, without their `GOOD` wrapper.
pub async fn list_desires(State(state): State<AppState>) -> Json<SentencesResponse> {
    let view = state.mind.read().await.view();
    Json(SentencesResponse {
        generation: view.generation(),
        sentences: view.desires().cloned().collect(),
    })
}

/// List every percept on record.
pub async fn list_percepts(State(state): State<AppState>) -> Json<Vec<PerceptRecord>> {
    Json(state.mind.read().await.percepts().to_vec())
}

/// Queue a percept for the engine.
pub async fn submit_percept(
    State(state): State<AppState>,
    Json(req): Json<PerceptRequest>,
) -> Result<(StatusCode, Json<PerceptAccepted>), (StatusCode, String)> {
    let word = state
        .lexicon
        .read()
        .await
        .word(&req.characteristic)
        .map_err(error_response)?;
    if *word.semantic_type() != SemanticType::predicate() {
        return Err(error_response(NoesisError::TypeMismatch {
            expected: SemanticType::predicate(),
            found: word.semantic_type().clone(),
        }));
    }

    let report = PerceptReport {
        characteristic: req.characteristic.clone(),
        location: req.location,
    };
    state.percepts.send(report).await.map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Engine is not accepting percepts".to_string(),
        )
    })?;
    debug!("Queued percept {}", req.characteristic);

    Ok((
        StatusCode::ACCEPTED,
        Json(PerceptAccepted {
            status: "queued".to_string(),
            characteristic: req.characteristic,
        }),
    ))
}
