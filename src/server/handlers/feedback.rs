//! Post-visit feedback handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

use crate::server::AppState;
use crate::server::types::*;
use crate::tokens::{FeedbackGrant, Lookup};

pub async fn feedback_create_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VisitorIdRequest>,
) -> ApiResult<TokenResponse> {
    let visitor_id =
        parse_id(&req.visitor_id).ok_or_else(|| ApiError::bad_request("visitor_id required"))?;

    let session = state
        .db
        .latest_session(visitor_id)
        .await
        .map_err(|e| ApiError::internal("Failed to create token", &e))?
        .ok_or_else(|| ApiError::not_found("No session found for visitor"))?;
    if session.rating.is_some() {
        return Err(ApiError::bad_request("Already rated"));
    }

    let token = state.feedback_tokens.issue(FeedbackGrant { visitor_id });
    let link = state
        .server
        .public_url(&format!("feedback.html?token={token}"));
    tracing::info!(
        visitor_id,
        session_id = session.session_id,
        %link,
        "Feedback token created"
    );

    Ok(Json(TokenResponse { token }))
}

pub async fn feedback_verify_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> ApiResult<FeedbackTokenInfo> {
    match state.feedback_tokens.lookup(&token) {
        Lookup::Live(grant) => Ok(Json(FeedbackTokenInfo {
            visitor_id: grant.visitor_id,
        })),
        Lookup::Expired => Err(ApiError::bad_request("Token expired")),
        Lookup::Missing => Err(ApiError::not_found("Invalid token")),
    }
}

pub async fn feedback_submit_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackSubmitRequest>,
) -> ApiResult<MessageResponse> {
    let (Some(token), Some(rating)) = (req.token.as_deref(), req.rating.as_ref()) else {
        return Err(ApiError::bad_request("token and rating required"));
    };
    let rating = parse_rating(rating)
        .ok_or_else(|| ApiError::bad_request("rating must be an integer from 1 to 5"))?;

    let claim = match state.feedback_tokens.claim(token) {
        Lookup::Live(claim) => claim,
        Lookup::Expired => return Err(ApiError::bad_request("Token expired")),
        Lookup::Missing => return Err(ApiError::bad_request("Invalid token")),
    };
    let grant = claim.value;

    let feedback = req
        .feedback
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());
    let result = state
        .db
        .submit_feedback(grant.visitor_id, rating, feedback)
        .await;
    match result {
        Ok(true) => {}
        Ok(false) => {
            state.feedback_tokens.restore(token, claim);
            return Err(ApiError::not_found("No session found for visitor"));
        }
        Err(e) => {
            state.feedback_tokens.restore(token, claim);
            return Err(ApiError::internal("Server error", &e));
        }
    }

    tracing::info!(visitor_id = grant.visitor_id, rating, "Feedback saved");
    Ok(Json(MessageResponse {
        message: "Feedback saved",
    }))
}

fn parse_rating(value: &Value) -> Option<u8> {
    let rating = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u8::try_from(rating).ok().filter(|r| (1..=5).contains(r))
}
