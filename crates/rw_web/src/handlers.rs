use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use rw_core::{ArticleOutput, Error, Tone};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::form::{FormController, FormSnapshot};
use crate::views;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    #[serde(default)]
    pub tone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToneInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// JSON error body returned by the API routes.
pub struct ApiError(pub Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            err if err.is_validation() => StatusCode::BAD_REQUEST,
            Error::Busy => StatusCode::CONFLICT,
            Error::Api { .. }
            | Error::Http(_)
            | Error::UnexpectedOutput { .. }
            | Error::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Runs the generation on its own task so that a dropped connection does not
/// abandon a request halfway.
async fn run_generation(
    controller: Arc<FormController>,
    request: GenerateRequest,
) -> Result<ArticleOutput, ApiError> {
    tokio::spawn(async move {
        controller
            .generate(&request.text, request.tone.as_deref())
            .await
    })
    .await
    .map_err(|e| {
        tracing::error!("Generation task failed: {}", e);
        ApiError(Error::Internal(format!("generation task failed: {}", e)))
    })?
    .map_err(ApiError)
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::render_page(&state.controller.snapshot()))
}

pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(request): Form<GenerateRequest>,
) -> Html<String> {
    match run_generation(state.controller.clone(), request).await {
        Ok(article) => tracing::debug!("Form generated \"{}\"", article.title),
        Err(ApiError(err)) => tracing::debug!("Form generation failed ({})", err.kind()),
    }
    Html(views::render_page(&state.controller.snapshot()))
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ArticleOutput>, ApiError> {
    run_generation(state.controller.clone(), request).await.map(Json)
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<FormSnapshot> {
    Json(state.controller.snapshot())
}

pub async fn list_tones() -> Json<Vec<ToneInfo>> {
    Json(
        Tone::ALL
            .iter()
            .map(|tone| ToneInfo {
                id: tone.id(),
                label: tone.label(),
                description: tone.description(),
            })
            .collect(),
    )
}

pub async fn copy_text(State(state): State<Arc<AppState>>) -> Response {
    match state.controller.snapshot().view.article() {
        Some(article) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            article.to_plain_text(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No article has been generated yet").into_response(),
    }
}
