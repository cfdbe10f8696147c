// SPDX-License-Identifier: MIT

//! HTTP shell around the workflow executor

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::IntakeError;
use crate::workflow::{DocumentKind, RunOutcome, WorkflowExecutor, WorkflowState};

#[derive(Debug, Deserialize)]
struct EligibilityRequest {
    documents: HashMap<DocumentKind, String>,
}

pub async fn serve(executor: Arc<WorkflowExecutor>, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/eligibility", post(check_eligibility))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(executor);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn check_eligibility(
    State(executor): State<Arc<WorkflowExecutor>>,
    Json(request): Json<EligibilityRequest>,
) -> impl IntoResponse {
    let state = WorkflowState::new(request.documents);

    match executor.run(state).await {
        Ok(RunOutcome::Completed(response)) => (
            StatusCode::OK,
            Json(json!({
                "status": response.status,
                "reason": response.reason
            })),
        ),
        Ok(RunOutcome::Cancelled) => (
            // No cancel source is wired into the HTTP path today
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "run cancelled" })),
        ),
        Err(IntakeError::InputIncomplete) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "no usable document text in the application" })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}
