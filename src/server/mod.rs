//! Axum HTTP server for the persona and visitor-queue APIs.

mod handlers;
pub mod types;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::header,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, TokenConfig};
use crate::db::Database;
use crate::error::Error;
use crate::persona::PersonaService;
use crate::tokens::{FeedbackGrant, TempVisitor, TtlStore};

use handlers::feedback::{feedback_create_handler, feedback_submit_handler, feedback_verify_handler};
use handlers::persona::persona_summary_handler;
use handlers::visitors::{
    visitor_cancel_handler, visitor_list_handler, visitor_start_handler, visitor_submit_handler,
    visitor_temp_create_handler, visitor_temp_get_handler,
};
use types::HealthResponse;

/// How often expired QR and feedback tokens are swept.
pub const TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state for every handler.
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub persona: Arc<PersonaService>,
    pub temp_visitors: TtlStore<TempVisitor>,
    pub feedback_tokens: TtlStore<FeedbackGrant>,
    pub server: ServerConfig,
}

impl AppState {
    pub fn new(
        db: Arc<dyn Database>,
        persona: Arc<PersonaService>,
        server: ServerConfig,
        tokens: &TokenConfig,
    ) -> Self {
        Self {
            db,
            persona,
            temp_visitors: TtlStore::new(tokens.temp_visitor_ttl),
            feedback_tokens: TtlStore::new(tokens.feedback_ttl),
            server,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let visitors = Router::new()
        .route("/temp-create", post(visitor_temp_create_handler))
        .route("/temp/{token}", get(visitor_temp_get_handler))
        .route("/submit", post(visitor_submit_handler))
        .route("/list", get(visitor_list_handler))
        .route("/cancel", post(visitor_cancel_handler))
        .route("/start", post(visitor_start_handler));

    let feedback = Router::new()
        .route("/create", post(feedback_create_handler))
        .route("/submit", post(feedback_submit_handler))
        .route("/{token}", get(feedback_verify_handler));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/persona-summary", post(persona_summary_handler))
        .nest("/api/visitor", visitors)
        .nest("/api/feedback", feedback)
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {addr}: {e}")))?;
    let bound = listener
        .local_addr()
        .map_err(|e| Error::Server(format!("Failed to get local addr: {e}")))?;

    let purger = spawn_token_purger(Arc::clone(&state), TOKEN_PURGE_INTERVAL);
    tracing::info!(addr = %bound, public_url = %state.server.public_base_url, "HTTP server listening");

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Server(e.to_string()));

    purger.abort();
    tracing::info!("HTTP server stopped");
    result
}

/// Periodically evict expired tokens from both stores.
pub fn spawn_token_purger(
    state: Arc<AppState>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let temp = state.temp_visitors.purge_expired();
            let feedback = state.feedback_tokens.purge_expired();
            if temp + feedback > 0 {
                tracing::debug!(temp, feedback, "Purged expired tokens");
            }
        }
    })
}

async fn health_handler() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy",
        service: "heritxr",
    })
}
