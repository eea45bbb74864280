//! HTTP surface: upload form, artifact creation and artifact serving.

mod error_response;
mod handlers;
mod router;

pub use error_response::status_for;
pub use router::{AppState, build_router};
