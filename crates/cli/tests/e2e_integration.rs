//! End-to-end integration tests for the CropSage advisory runtime.
//!
//! These exercise the full pipeline through the HTTP gateway: prediction,
//! session caching, prompt composition, retrieval-augmented chat, and the
//! capability surface — with scripted backends standing in for the model
//! server, knowledge index, and generation API.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cropsage_core::error::{ClassifierError, GenerationError, RetrievalError};
use cropsage_core::{CropClassifier, FeatureVector, Generator, KnowledgeIndex, Passage, Prediction};
use cropsage_gateway::build_router;
use cropsage_orchestrator::Orchestrator;
use cropsage_retrieval::ContextRetriever;
use cropsage_session::SessionStore;

// ── Scripted backends ────────────────────────────────────────────────────

/// Classifier that returns scripted labels in sequence.
struct ScriptedClassifier {
    labels: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    fn new(labels: &[&str]) -> Self {
        Self {
            labels: Mutex::new(labels.iter().rev().map(|s| s.to_string()).collect()),
        }
    }
}

#[async_trait::async_trait]
impl CropClassifier for ScriptedClassifier {
    fn name(&self) -> &str {
        "e2e_classifier"
    }

    async fn predict(&self, _features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        let label = self
            .labels
            .lock()
            .unwrap()
            .pop()
            .expect("ScriptedClassifier exhausted");
        Ok(Prediction {
            raw: json!({"prediction": [label]}),
            label,
        })
    }
}

struct PaddyIndex;

#[async_trait::async_trait]
impl KnowledgeIndex for PaddyIndex {
    fn name(&self) -> &str {
        "e2e_index"
    }

    async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        Ok(vec![Passage {
            content: "Rice grows best in flooded paddies with 20-30°C.".to_string(),
            source: Some("agronomy#1".to_string()),
            score: 0.9,
        }])
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(1)
    }
}

/// Echoes its prompt so tests can observe exactly what was dispatched.
struct EchoGenerator;

#[async_trait::async_trait]
impl Generator for EchoGenerator {
    fn name(&self) -> &str {
        "e2e_generator"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(prompt.to_string())
    }
}

fn app_with(labels: &[&str]) -> Router {
    let orchestrator = Orchestrator::new(
        Arc::new(SessionStore::new(16)),
        Some(Arc::new(ScriptedClassifier::new(labels))),
        Some(ContextRetriever::new(Arc::new(PaddyIndex), 3)),
        Some(Arc::new(EchoGenerator)),
    );
    build_router(orchestrator)
}

fn post(uri: &str, client: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(client) = client {
        builder = builder.header("x-client-id", client);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, client: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-client-id", client)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn rice_conditions() -> Value {
    json!({
        "nitrogen": 90, "phosphorus": 42, "potassium": 43,
        "temperature": 20.9, "humidity": 82, "pH_Level": 6.5,
        "rainfall": 202.9
    })
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_predict_query_latest_cycle() {
    let app = app_with(&["rice"]);

    let response = app
        .clone()
        .oneshot(post("/v1/predict", Some("grower-1"), rice_conditions()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["label"], "rice");
    assert_eq!(body["raw_prediction"]["prediction"][0], "rice");

    // The recommendation prompt is grounded in the cached prediction.
    let response = app
        .clone()
        .oneshot(post(
            "/v1/query",
            Some("grower-1"),
            json!({"query": "which fertilizer should I use?"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let answer = json_body(response).await["answer"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(answer.contains("Primary Crop: rice"));
    assert!(answer.contains("Rainfall: 202.9mm"));
    assert!(answer.contains("which fertilizer should I use?"));

    // The session now carries the last question.
    let response = app.oneshot(get("/v1/latest", "grower-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["predicted_label"], "rice");
    assert_eq!(body["last_query"], "which fertilizer should I use?");
}

#[tokio::test]
async fn e2e_repredict_overwrites_session() {
    let app = app_with(&["rice", "maize"]);

    app.clone()
        .oneshot(post("/v1/predict", Some("grower-1"), rice_conditions()))
        .await
        .unwrap();

    let mut drier = rice_conditions();
    drier["rainfall"] = json!(85.1);
    app.clone()
        .oneshot(post("/v1/predict", Some("grower-1"), drier))
        .await
        .unwrap();

    let body = json_body(app.oneshot(get("/v1/latest", "grower-1")).await.unwrap()).await;
    assert_eq!(body["predicted_label"], "maize");
    assert_eq!(body["features"]["rainfall"], 85.1);
}

#[tokio::test]
async fn e2e_sessions_are_isolated_per_client() {
    let app = app_with(&["rice", "cotton"]);

    app.clone()
        .oneshot(post("/v1/predict", Some("grower-1"), rice_conditions()))
        .await
        .unwrap();
    app.clone()
        .oneshot(post("/v1/predict", Some("grower-2"), rice_conditions()))
        .await
        .unwrap();

    let one = json_body(
        app.clone()
            .oneshot(get("/v1/latest", "grower-1"))
            .await
            .unwrap(),
    )
    .await;
    let two = json_body(app.oneshot(get("/v1/latest", "grower-2")).await.unwrap()).await;
    assert_eq!(one["predicted_label"], "rice");
    assert_eq!(two["predicted_label"], "cotton");
}

#[tokio::test]
async fn e2e_chat_is_grounded_and_session_free() {
    let app = app_with(&[]);

    let response = app
        .oneshot(post(
            "/v1/chat",
            None,
            json!({"query": "when should I transplant rice seedlings?"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let answer = json_body(response).await["answer"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(answer.contains("flooded paddies"));
    assert!(answer.contains("when should I transplant rice seedlings?"));
    // Open mode never references the structured session template.
    assert!(!answer.contains("Primary Crop"));
}

#[tokio::test]
async fn e2e_query_without_prediction_degrades_to_unknown() {
    let app = app_with(&[]);

    let response = app
        .oneshot(post(
            "/v1/query",
            Some("stranger"),
            json!({"query": "what should I plant?"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let answer = json_body(response).await["answer"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(answer.contains("Primary Crop: Unknown"));
    assert!(answer.contains("Nitrogen: 0ppm"));
}

#[tokio::test]
async fn e2e_bare_deployment_reports_and_refuses() {
    let orchestrator = Orchestrator::new(Arc::new(SessionStore::new(16)), None, None, None);
    let app = build_router(orchestrator);

    let body = json_body(
        app.clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["classifier_enabled"], false);
    assert_eq!(body["knowledge_index_enabled"], false);
    assert_eq!(body["generator_enabled"], false);

    let response = app
        .clone()
        .oneshot(post("/v1/predict", Some("grower-1"), rice_conditions()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], "model_unavailable");

    let response = app
        .oneshot(post("/v1/chat", None, json!({"query": "anything"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], "retrieval_unavailable");
}

#[tokio::test]
async fn e2e_validation_error_names_the_field() {
    let app = app_with(&["rice"]);

    let mut bad = rice_conditions();
    bad["temperature"] = json!({"celsius": 20.9});

    let response = app
        .oneshot(post("/v1/predict", Some("grower-1"), bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].as_str().unwrap().contains("temperature"));
}
