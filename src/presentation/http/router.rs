//! Route table and shared handler state.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use super::handlers;
use crate::application::use_cases::CreateMemeUseCase;
use crate::domain::ports::ArtifactStore;

/// Room for the multipart framing and the noun field on top of the file.
const FORM_OVERHEAD: usize = 64 * 1024;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Artifact creation.
    pub use_case: Arc<CreateMemeUseCase>,
    /// Read access for serving artifacts.
    pub store: Arc<dyn ArtifactStore>,
    /// Maximum size of the uploaded file in bytes.
    pub upload_limit: usize,
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.upload_limit.saturating_add(FORM_OVERHEAD);
    Router::new()
        .route("/", get(handlers::index))
        .route("/create", post(handlers::create))
        .route("/img/{name}", get(handlers::artifact))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
