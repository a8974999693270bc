//! HTTP API gateway for CropSage.
//!
//! A thin Axum adapter over the orchestrator: five routes, one error
//! shape. Client identity arrives as an opaque `x-client-id` header
//! resolved by the caller's own request layer; the gateway never derives
//! identity from the connection.
//!
//! Which backends are wired is decided once at startup from config —
//! deployments with and without generation run this same router and
//! differ only in which routes answer with an unavailable error.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use cropsage_core::error::{ClassifierError, GenerationError, RetrievalError, ValidationError};
use cropsage_core::{Error, SessionRecord};
use cropsage_orchestrator::{Orchestrator, PredictOutcome, StatusReport};
use cropsage_retrieval::ContextRetriever;
use cropsage_session::SessionStore;

/// The single error shape every route returns on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

type ErrorReply = (StatusCode, Json<ErrorBody>);

fn error_reply(err: Error) -> ErrorReply {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Classifier(ClassifierError::NotConfigured)
        | Error::Retrieval(RetrievalError::Unavailable(_))
        | Error::Generation(GenerationError::Unconfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Generation(GenerationError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
        Error::Classifier(_) | Error::Retrieval(_) | Error::Generation(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(kind = err.kind(), error = %err, "Request failed");
    }
    (
        status,
        Json(ErrorBody {
            error: err.kind().to_string(),
            details: err.to_string(),
        }),
    )
}

/// Pull the caller-supplied client id off the request.
fn client_id(headers: &HeaderMap) -> Result<&str, ErrorReply> {
    headers
        .get("x-client-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "validation_error".to_string(),
                    details: "missing x-client-id header".to_string(),
                }),
            )
        })
}

/// Build the router. CORS is permissive for GET/POST with JSON bodies;
/// every request is trace-logged.
pub fn build_router(orchestrator: Orchestrator) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static("x-client-id"),
        ]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/predict", post(predict_handler))
        .route("/v1/query", post(query_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/latest", get(latest_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(orchestrator)
}

/// Start the gateway HTTP server.
///
/// Backends are built from config exactly once here; a misconfigured
/// backend fails startup instead of surfacing per-request.
pub async fn start(config: cropsage_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let classifier = cropsage_classifier::build_from_config(&config);
    let index = cropsage_retrieval::build_from_config(&config)?;
    let retriever = index.map(|index| ContextRetriever::new(index, config.retrieval.top_k));
    let generator = cropsage_generation::build_from_config(&config)?;

    info!(
        classifier = classifier.is_some(),
        knowledge_index = retriever.is_some(),
        generator = generator.is_some(),
        "Backends resolved"
    );

    let sessions = Arc::new(SessionStore::new(config.session.capacity));
    let orchestrator = Orchestrator::new(sessions, classifier, retriever, generator);
    let app = build_router(orchestrator);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

async fn health_handler(State(orchestrator): State<Orchestrator>) -> Json<StatusReport> {
    Json(orchestrator.status().await)
}

async fn predict_handler(
    State(orchestrator): State<Orchestrator>,
    headers: HeaderMap,
    Json(fields): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<PredictOutcome>, ErrorReply> {
    let client = client_id(&headers)?;
    let outcome = orchestrator
        .predict(client, &fields)
        .await
        .map_err(error_reply)?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

async fn query_handler(
    State(orchestrator): State<Orchestrator>,
    headers: HeaderMap,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<AnswerResponse>, ErrorReply> {
    let client = client_id(&headers)?;
    if payload.query.trim().is_empty() {
        return Err(error_reply(ValidationError::MissingInput("query".to_string()).into()));
    }
    let answer = orchestrator
        .recommend(client, &payload.query)
        .await
        .map_err(error_reply)?;
    Ok(Json(AnswerResponse { answer }))
}

async fn chat_handler(
    State(orchestrator): State<Orchestrator>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<AnswerResponse>, ErrorReply> {
    if payload.query.trim().is_empty() {
        return Err(error_reply(ValidationError::MissingInput("query".to_string()).into()));
    }
    let answer = orchestrator.chat(&payload.query).await.map_err(error_reply)?;
    Ok(Json(AnswerResponse { answer }))
}

async fn latest_handler(
    State(orchestrator): State<Orchestrator>,
    headers: HeaderMap,
) -> Result<Json<SessionRecord>, ErrorReply> {
    let client = client_id(&headers)?;
    match orchestrator.latest(client).await {
        Some(record) => Ok(Json(record)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "not_found".to_string(),
                details: "no prediction recorded for this client".to_string(),
            }),
        )),
    }
}
