//! Presentation layer exposing the service over HTTP.

/// Routes, handlers and error responses.
pub mod http;

pub use http::{AppState, build_router};
