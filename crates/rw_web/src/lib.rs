use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod form;
pub mod handlers;
pub mod state;
pub mod views;

pub use form::{FormController, FormInput, FormSnapshot, ViewState, INTERRUPTED_MESSAGE};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::index))
        .route("/generate", post(handlers::submit_form))
        .route("/api/generate", post(handlers::generate))
        .route("/api/state", get(handlers::get_state))
        .route("/api/tones", get(handlers::list_tones))
        .route("/api/copy", get(handlers::copy_text))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves the form until the process stops.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await
}

pub mod prelude {
    pub use crate::{create_app, AppState, FormController, ViewState};
    pub use rw_core::{ArticleOutput, Error, Result};
}
