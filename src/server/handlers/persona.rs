//! `POST /persona-summary`.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::PersonaError;
use crate::persona::{PersonaSubmission, RawVisitorInput};
use crate::server::AppState;
use crate::server::types::ApiError;

pub async fn persona_summary_handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<RawVisitorInput>,
) -> Response {
    match state.persona.submit(raw).await {
        Ok(stored @ PersonaSubmission::Stored { .. }) => Json(stored).into_response(),
        Ok(PersonaSubmission::Rejected {
            confidence,
            attempts,
        }) => ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Persona failed validation after multiple attempts",
        )
        .with("confidence", confidence)
        .with("attempts", attempts)
        .into_response(),
        Err(e @ PersonaError::Generation { .. }) => {
            ApiError::internal("Persona generation failed", &e).into_response()
        }
        Err(e @ PersonaError::Persistence(_)) => {
            ApiError::internal("DB insert failed", &e).into_response()
        }
    }
}
