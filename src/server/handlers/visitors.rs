//! QR check-in and guide queue handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::persona::normalize::minutes;
use crate::queue::{QueueEntry, QueueSubmission};
use crate::server::AppState;
use crate::server::types::*;
use crate::tokens::{Lookup, TempVisitor};

pub async fn visitor_temp_create_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TempCreateRequest>,
) -> ApiResult<TokenResponse> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let duration = req.duration.as_ref().and_then(minutes).filter(|d| *d > 0);
    let (false, Some(duration)) = (name.is_empty(), duration) else {
        return Err(ApiError::bad_request("Name and duration are required"));
    };

    let token = state.temp_visitors.issue(TempVisitor {
        name: name.to_string(),
        duration,
    });
    tracing::info!(%token, name, duration, "Temp visitor created");
    Ok(Json(TokenResponse { token }))
}

pub async fn visitor_temp_get_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> ApiResult<TempVisitor> {
    match state.temp_visitors.lookup(&token) {
        Lookup::Live(visitor) => Ok(Json(visitor)),
        Lookup::Expired | Lookup::Missing => Err(ApiError::not_found("Invalid or expired QR")),
    }
}

pub async fn visitor_submit_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueueSubmission>,
) -> ApiResult<SubmitResponse> {
    let token = req.token.clone().unwrap_or_default();
    let Lookup::Live(claim) = state.temp_visitors.claim(&token) else {
        return Err(ApiError::bad_request("Invalid or expired token"));
    };

    let visitor = req.into_new_visitor(claim.value.clone());
    let (visitor_id, queue_number) = match state.db.insert_queued_visitor(&visitor).await {
        Ok(inserted) => inserted,
        Err(e) => {
            // Give the token back so the kiosk can retry.
            state.temp_visitors.restore(&token, claim);
            return Err(ApiError::internal("Failed to save visitor", &e));
        }
    };
    tracing::info!(visitor_id, queue_number, "Visitor queued");

    Ok(Json(SubmitResponse {
        message: "Visitor data saved successfully",
        visitor_id,
        queue_number,
    }))
}

pub async fn visitor_list_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<QueueEntry>> {
    let entries = state
        .db
        .list_queue()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch visitor list", &e))?;
    Ok(Json(entries))
}

pub async fn visitor_cancel_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VisitorIdRequest>,
) -> ApiResult<MessageResponse> {
    let visitor_id =
        parse_id(&req.visitor_id).ok_or_else(|| ApiError::bad_request("visitor_id is required"))?;

    let found = state
        .db
        .cancel_visitor(visitor_id)
        .await
        .map_err(|e| ApiError::internal("Failed to cancel visitor", &e))?;
    if !found {
        return Err(ApiError::not_found("Visitor not found"));
    }

    tracing::info!(visitor_id, "Visitor cancelled");
    Ok(Json(MessageResponse {
        message: "Visitor cancelled successfully",
    }))
}

pub async fn visitor_start_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VisitorIdRequest>,
) -> ApiResult<StartResponse> {
    let visitor_id =
        parse_id(&req.visitor_id).ok_or_else(|| ApiError::bad_request("visitor_id is required"))?;

    let found = state
        .db
        .start_visitor(visitor_id)
        .await
        .map_err(|e| ApiError::internal("Failed to start visit", &e))?;
    if !found {
        return Err(ApiError::not_found("Visitor not found"));
    }

    let session_id = state
        .db
        .start_session(visitor_id)
        .await
        .map_err(|e| ApiError::internal("Failed to start visit", &e))?;

    tracing::info!(visitor_id, session_id, "Visit started");
    Ok(Json(StartResponse {
        message: "Visit started",
        session_id,
    }))
}
