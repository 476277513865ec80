//! HTTP API.

use axum::http::StatusCode;
use noesis_core::NoesisError;

pub mod health;
pub mod mind;
pub mod plan;

/// Map a core error onto a status code and message.
pub fn error_response(error: NoesisError) -> (StatusCode, String) {
    let status = if error.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, error.to_string())
}
