//! End-to-end tests for the HTTP API, driving the router in-process with a
//! scripted persona generator and a file-backed libSQL database.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use heritxr::config::{PersonaConfig, ServerConfig, TokenConfig};
use heritxr::db::libsql::LibSqlBackend;
use heritxr::db::{Database, SessionStore};
use heritxr::error::GenerationError;
use heritxr::persona::{PersonaGenerator, PersonaPipeline, PersonaService, VisitorAttributes};
use heritxr::server::{AppState, router};

const PASSING: &str = "A 19 25 year old tourism visitor with a strong interest in \
                       architecture who prefers simple language on a first visit.";

/// Answers every call with the same text and counts calls.
struct FixedGenerator {
    reply: Result<&'static str, ()>,
    calls: AtomicU32,
}

#[async_trait]
impl PersonaGenerator for FixedGenerator {
    async fn generate(&self, _attrs: &VisitorAttributes) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Ok(text) => Ok(text.to_string()),
            Err(()) => Err(GenerationError::EmptyResponse {
                model: "fake".to_string(),
            }),
        }
    }
}

struct Harness {
    app: Router,
    db: Arc<dyn Database>,
    generator: Arc<FixedGenerator>,
    _dir: tempfile::TempDir,
}

async fn harness_with(reply: Result<&'static str, ()>, tokens: TokenConfig) -> Harness {
    let dir = tempfile::tempdir().expect("create temp dir");
    let backend = LibSqlBackend::new_local(dir.path().join("api.db"))
        .await
        .expect("create db");
    backend.run_migrations().await.expect("migrate");
    let db: Arc<dyn Database> = Arc::new(backend);

    let generator = Arc::new(FixedGenerator {
        reply,
        calls: AtomicU32::new(0),
    });
    let config = PersonaConfig {
        retry_backoff: Duration::ZERO,
        ..PersonaConfig::default()
    };
    let pipeline = PersonaPipeline::new(generator.clone(), config);
    let persona = Arc::new(PersonaService::new(pipeline, db.clone()));
    let state = Arc::new(AppState::new(
        db.clone(),
        persona,
        ServerConfig::default(),
        &tokens,
    ));

    Harness {
        app: router(state),
        db,
        generator,
        _dir: dir,
    }
}

async fn harness() -> Harness {
    harness_with(Ok(PASSING), TokenConfig::default()).await
}

impl Harness {
    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body)).await
    }

    /// Check a visitor in through the QR flow and return its id.
    async fn enqueue(&self, name: &str) -> i64 {
        let (_, created) = self
            .post("/api/visitor/temp-create", json!({"name": name, "duration": 30}))
            .await;
        let token = created["token"].as_str().unwrap().to_string();
        let (status, body) = self
            .post("/api/visitor/submit", json!({"token": token}))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["visitor_id"].as_i64().unwrap()
    }
}

fn scenario() -> Value {
    json!({
        "age_group": "19-25",
        "visit_purpose": "Tourism",
        "interest_architecture": 1,
        "interest_history": 0,
        "interest_spirituality": 0,
        "interest_art": 0,
        "language_level": "Simple",
        "visited_before": false,
    })
}

#[tokio::test]
async fn health_reports_service() {
    let h = harness().await;
    let (status, body) = h.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "heritxr"}));
}

#[tokio::test]
async fn accepted_persona_is_stored_and_returned() {
    let h = harness().await;
    let (status, body) = h.post("/persona-summary", scenario()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["visitor_id"].as_i64().unwrap() > 0);
    assert_eq!(body["persona_summary"], PASSING);
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((confidence - 5.0 / 7.0).abs() < 1e-9);
    assert_eq!(h.generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_persona_returns_422_with_confidence() {
    let h = harness_with(Ok("A visitor."), TokenConfig::default()).await;
    let (status, body) = h.post("/persona-summary", scenario()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["confidence"], json!(0.0));
    assert_eq!(body["attempts"], json!(3));
    assert!(body["error"].is_string());
    assert_eq!(h.generator.calls.load(Ordering::SeqCst), 3);

    let (_, list) = h.get("/api/visitor/list").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn generation_failure_returns_500() {
    let h = harness_with(Err(()), TokenConfig::default()).await;
    let (status, body) = h.post("/persona-summary", scenario()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Persona generation failed");
    assert_eq!(h.generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn temp_visitor_requires_name_and_duration() {
    let h = harness().await;
    let (status, _) = h
        .post("/api/visitor/temp-create", json!({"name": "Kasun"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .post("/api/visitor/temp-create", json!({"name": " ", "duration": 20}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn qr_flow_queues_visitor_and_consumes_token() {
    let h = harness().await;
    let (status, created) = h
        .post(
            "/api/visitor/temp-create",
            json!({"name": "Kasun", "duration": "45"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = created["token"].as_str().unwrap().to_string();

    let (status, temp) = h.get(&format!("/api/visitor/temp/{token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(temp, json!({"name": "Kasun", "duration": 45}));

    let (status, body) = h
        .post(
            "/api/visitor/submit",
            json!({"token": token, "visit_purpose": "Tourism", "preferred_time": "Night"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queue_number"], 1);
    assert_eq!(body["message"], "Visitor data saved successfully");

    // Token is single-use.
    let (status, _) = h.get(&format!("/api/visitor/temp/{token}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h
        .post("/api/visitor/submit", json!({"token": token}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = h.get("/api/visitor/list").await;
    assert_eq!(list[0]["name"], "Kasun");
    assert_eq!(list[0]["status"], "waiting");
}

#[tokio::test]
async fn concurrent_submits_queue_visitor_once() {
    let h = harness().await;
    let (_, created) = h
        .post("/api/visitor/temp-create", json!({"name": "Kasun", "duration": 30}))
        .await;
    let token = created["token"].as_str().unwrap().to_string();

    let ((first, _), (second, _)) = tokio::join!(
        h.post("/api/visitor/submit", json!({"token": token})),
        h.post("/api/visitor/submit", json!({"token": token})),
    );
    let mut statuses = vec![first.as_u16(), second.as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 400]);

    let (_, list) = h.get("/api/visitor/list").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stored_persona_does_not_take_a_queue_slot() {
    let h = harness().await;
    let (status, _) = h.post("/persona-summary", scenario()).await;
    assert_eq!(status, StatusCode::OK);

    let (_, created) = h
        .post("/api/visitor/temp-create", json!({"name": "Kasun", "duration": 30}))
        .await;
    let token = created["token"].as_str().unwrap();
    let (_, body) = h
        .post("/api/visitor/submit", json!({"token": token}))
        .await;
    assert_eq!(body["queue_number"], 1);

    let (_, list) = h.get("/api/visitor/list").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Kasun");
}

#[tokio::test]
async fn expired_qr_token_is_not_found() {
    let tokens = TokenConfig {
        temp_visitor_ttl: Duration::ZERO,
        ..TokenConfig::default()
    };
    let h = harness_with(Ok(PASSING), tokens).await;
    let (_, created) = h
        .post("/api/visitor/temp-create", json!({"name": "Kasun", "duration": 10}))
        .await;
    let token = created["token"].as_str().unwrap().to_string();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, _) = h.get(&format!("/api/visitor/temp/{token}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_validates_visitor() {
    let h = harness().await;
    let (status, _) = h.post("/api/visitor/cancel", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .post("/api/visitor/cancel", json!({"visitor_id": 999}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = h.enqueue("Amaya").await;
    let (status, _) = h
        .post("/api/visitor/cancel", json!({"visitor_id": id.to_string()}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = h.get("/api/visitor/list").await;
    assert_eq!(list[0]["status"], "cancelled");
}

#[tokio::test]
async fn feedback_flow_rates_session_once() {
    let h = harness().await;
    let id = h.enqueue("Amaya").await;

    // No session yet.
    let (status, _) = h
        .post("/api/feedback/create", json!({"visitor_id": id}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, started) = h
        .post("/api/visitor/start", json!({"visitor_id": id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(started["session_id"].as_i64().unwrap() > 0);

    let (status, created) = h
        .post("/api/feedback/create", json!({"visitor_id": id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = created["token"].as_str().unwrap().to_string();

    let (status, info) = h.get(&format!("/api/feedback/{token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["visitor_id"], id);

    let (status, _) = h
        .post("/api/feedback/submit", json!({"token": token, "rating": 9}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .post(
            "/api/feedback/submit",
            json!({"token": token, "rating": 5, "feedback": "Loved it"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Feedback saved");

    let session = h.db.latest_session(id).await.unwrap().unwrap();
    assert_eq!(session.rating, Some(5));

    // Token consumed; session already rated.
    let (status, _) = h.get(&format!("/api/feedback/{token}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = h
        .post("/api/feedback/create", json!({"visitor_id": id}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already rated");
}

#[tokio::test]
async fn concurrent_feedback_submits_save_once() {
    let h = harness().await;
    let id = h.enqueue("Amaya").await;
    h.post("/api/visitor/start", json!({"visitor_id": id})).await;
    let (_, created) = h
        .post("/api/feedback/create", json!({"visitor_id": id}))
        .await;
    let token = created["token"].as_str().unwrap().to_string();

    let ((first, _), (second, _)) = tokio::join!(
        h.post("/api/feedback/submit", json!({"token": token, "rating": 5})),
        h.post("/api/feedback/submit", json!({"token": token, "rating": 1})),
    );
    let mut statuses = vec![first.as_u16(), second.as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 400]);
}

#[tokio::test]
async fn expired_feedback_token_is_rejected() {
    let tokens = TokenConfig {
        feedback_ttl: Duration::ZERO,
        ..TokenConfig::default()
    };
    let h = harness_with(Ok(PASSING), tokens).await;
    let id = h.enqueue("Amaya").await;
    h.post("/api/visitor/start", json!({"visitor_id": id})).await;
    let (_, created) = h
        .post("/api/feedback/create", json!({"visitor_id": id}))
        .await;
    let token = created["token"].as_str().unwrap().to_string();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, body) = h
        .post("/api/feedback/submit", json!({"token": token, "rating": 4}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Token expired");

    // The failed submit evicted it.
    let (status, _) = h.get(&format!("/api/feedback/{token}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
