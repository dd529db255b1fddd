//! Axum route handlers for the crewsmith HTTP server.
//!
//! # Routes
//!
//! - `GET    /health`           : Returns `{"status": "ok", "version": ..., "service": "crewsmith"}`
//! - `POST   /generate_agents`  : Reuse or synthesize a crew for a prompt and run it
//! - `GET    /agents/{crew_id}` : Raw `agents.yaml` of a crew
//! - `DELETE /agents/{crew_id}` : Delete a crew directory and its prompt record
//!
//! Errors are returned as `{"detail": "<message>"}`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::crews::orchestrator::{CrewOrchestrator, CrewStatus};
use crate::utilities::config::ServiceConfig;
use crate::utilities::errors::{CrewError, Result};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<CrewOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: CrewOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Build the production state: embedder, store and Gemini clients.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(CrewOrchestrator::from_config(config).await?))
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/generate_agents", post(generate_agents_handler))
        .route(
            "/agents/{crew_id}",
            get(get_agents_handler).delete(delete_crew_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PromptInput {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub crew_id: String,
    pub status: CrewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub crew_id: String,
    pub agents: String,
}

type ApiError = (StatusCode, Json<Value>);

/// Map a [`CrewError`] to a status code and `{"detail": ...}` body.
fn error_response(err: CrewError) -> ApiError {
    let status = match &err {
        CrewError::EmptyPrompt => StatusCode::BAD_REQUEST,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Server error: {}", err);
    }
    (status, Json(serde_json::json!({ "detail": err.to_string() })))
}

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "crewsmith",
    }))
}

/// POST /generate_agents: answer a prompt with a crew.
async fn generate_agents_handler(
    State(state): State<AppState>,
    Json(input): Json<PromptInput>,
) -> std::result::Result<Json<GenerateResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .generate(&input.prompt)
        .await
        .map_err(error_response)?;

    tracing::info!(
        crew_id = %outcome.crew_id,
        status = %outcome.status,
        "Prompt answered"
    );

    Ok(Json(GenerateResponse {
        crew_id: outcome.crew_id,
        status: outcome.status,
        similarity: outcome.similarity,
        output: outcome.output.raw,
    }))
}

/// GET /agents/{crew_id}: raw agent YAML.
async fn get_agents_handler(
    State(state): State<AppState>,
    Path(crew_id): Path<String>,
) -> std::result::Result<Json<AgentsResponse>, ApiError> {
    let agents = state
        .orchestrator
        .agents(&crew_id)
        .await
        .map_err(error_response)?;
    Ok(Json(AgentsResponse { crew_id, agents }))
}

/// DELETE /agents/{crew_id}: remove a crew.
async fn delete_crew_handler(
    State(state): State<AppState>,
    Path(crew_id): Path<String>,
) -> std::result::Result<Json<Value>, ApiError> {
    state
        .orchestrator
        .delete(&crew_id)
        .await
        .map_err(error_response)?;
    Ok(Json(serde_json::json!({
        "message": format!("Crew {} deleted successfully", crew_id),
    })))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::crews::{AgentSynthesizer, CrewExecutor, CrewMaterializer};
    use crate::memory::storage::InMemoryPromptStore;
    use crate::utilities::testing::{KeywordEmbedder, ScriptedLLM, TWO_AGENT_REPLY};

    fn test_state(dir: &std::path::Path, exec_llm: ScriptedLLM) -> AppState {
        AppState::new(CrewOrchestrator::new(
            Arc::new(KeywordEmbedder::new()),
            Arc::new(InMemoryPromptStore::new()),
            AgentSynthesizer::new(Arc::new(ScriptedLLM::always(TWO_AGENT_REPLY))),
            CrewMaterializer::new(dir),
            CrewExecutor::new(Arc::new(exec_llm)).with_verbose(false),
        ))
    }

    fn working_state(dir: &std::path::Path) -> AppState {
        test_state(dir, ScriptedLLM::always("Final Answer: Salt wind"))
    }

    fn generate_request(prompt: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate_agents")
            .header("Content-Type", "application/json")
            .body(Body::from(
                serde_json::json!({ "prompt": prompt }).to_string(),
            ))
            .unwrap()
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(working_state(dir.path()));

        let response = app.oneshot(request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "crewsmith");
    }

    #[tokio::test]
    async fn test_generate_new_then_existing() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(working_state(dir.path()));

        let response = app
            .clone()
            .oneshot(generate_request("Write a haiku about the sea"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let first = json_body(response).await;
        assert_eq!(first["status"], "new");
        assert_eq!(first["output"], "Salt wind");
        assert!(first.get("similarity").is_none());

        let response = app
            .oneshot(generate_request("Write a haiku about the sea"))
            .await
            .unwrap();
        let second = json_body(response).await;
        assert_eq!(second["status"], "existing");
        assert_eq!(second["crew_id"], first["crew_id"]);
        assert!(second["similarity"].as_f64().unwrap() > 0.99);
    }

    #[tokio::test]
    async fn test_generate_empty_prompt_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(working_state(dir.path()));

        let response = app.oneshot(generate_request("   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["detail"], "Prompt cannot be empty.");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_generate_execution_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(test_state(dir.path(), ScriptedLLM::failing("model overloaded")));

        let response = app.oneshot(generate_request("Write a haiku")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(json["detail"].as_str().unwrap().contains("model overloaded"));
    }

    #[tokio::test]
    async fn test_get_agents_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(working_state(dir.path()));

        let created = json_body(
            app.clone()
                .oneshot(generate_request("Write a haiku"))
                .await
                .unwrap(),
        )
        .await;
        let crew_id = created["crew_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request("GET", &format!("/agents/{}", crew_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["crew_id"], crew_id.as_str());
        let on_disk =
            std::fs::read_to_string(dir.path().join(&crew_id).join("agents.yaml")).unwrap();
        assert_eq!(json["agents"], on_disk.as_str());
    }

    #[tokio::test]
    async fn test_get_unknown_or_malformed_crew_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(working_state(dir.path()));

        let unknown = format!("/agents/{}", uuid::Uuid::new_v4());
        let response = app.clone().oneshot(request("GET", &unknown)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["detail"], "Crew not found");

        let response = app
            .oneshot(request("GET", "/agents/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(working_state(dir.path()));

        let created = json_body(
            app.clone()
                .oneshot(generate_request("Write a haiku"))
                .await
                .unwrap(),
        )
        .await;
        let uri = format!("/agents/{}", created["crew_id"].as_str().unwrap());

        let response = app.clone().oneshot(request("DELETE", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["message"].as_str().unwrap().ends_with("deleted successfully"));

        let response = app.clone().oneshot(request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(request("DELETE", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["detail"], "Crew not found");
    }

    #[tokio::test]
    async fn test_vanished_crew_dir_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(working_state(dir.path()));

        let created = json_body(
            app.clone()
                .oneshot(generate_request("Write a haiku"))
                .await
                .unwrap(),
        )
        .await;
        let crew_id = created["crew_id"].as_str().unwrap().to_string();
        std::fs::remove_dir_all(dir.path().join(&crew_id)).unwrap();

        let response = app
            .clone()
            .oneshot(generate_request("Write a haiku"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "new");
        assert_ne!(json["crew_id"], crew_id.as_str());

        let response = app
            .oneshot(request("DELETE", &format!("/agents/{}", crew_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
