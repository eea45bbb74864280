//! Request handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::{debug, error, info};

use super::error_response::from_multipart;
use super::router::AppState;
use crate::domain::entities::{ArtifactName, Noun};
use crate::domain::errors::{MemeError, MemeResult};
use crate::infrastructure::image::ContentAddresser;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>[meme intensifies]</title></head>
<body>
<form action="/create" method="post" enctype="multipart/form-data">
<p><label>Noun: <input type="text" name="noun" maxlength="64" required></label></p>
<p><label>Image: <input type="file" name="file" accept="image/*" required></label></p>
<p><input type="submit" value="Intensify"></p>
</form>
</body>
</html>
"#;

const NOUN_FIELD: &str = "noun";
const FILE_FIELD: &str = "file";

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `POST /create`
///
/// Streams the `file` field through the content addresser, then redirects
/// to the artifact.
pub async fn create(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> MemeResult<Redirect> {
    let mut multipart = multipart.map_err(|e| MemeError::malformed(e.body_text()))?;
    let limit = state.upload_limit;

    let mut noun = None;
    let mut addresser = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| from_multipart(&e, limit))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(NOUN_FIELD) => {
                let text = field.text().await.map_err(|e| from_multipart(&e, limit))?;
                noun = Some(Noun::parse(&text)?);
            }
            Some(FILE_FIELD) => {
                let mut upload = ContentAddresser::with_limit(limit);
                while let Some(chunk) = field.chunk().await.map_err(|e| from_multipart(&e, limit))? {
                    upload.feed(&chunk)?;
                }
                debug!(size = upload.received_bytes(), "Upload received");
                addresser = Some(upload);
            }
            other => debug!(field = ?other, "Ignoring form field"),
        }
    }

    let noun = noun.ok_or(MemeError::MissingField { field: NOUN_FIELD })?;
    let addresser = addresser.ok_or(MemeError::MissingField { field: FILE_FIELD })?;

    let upload = tokio::task::spawn_blocking(move || addresser.finish())
        .await
        .map_err(|e| MemeError::task(e.to_string()))??;

    let response = state.use_case.execute(noun, upload).await?;
    info!(
        artifact = %response.name,
        cache_hit = response.cache_hit,
        "Redirecting to artifact"
    );
    Ok(Redirect::to(&response.location()))
}

/// `GET /img/{name}`
pub async fn artifact(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(name) = ArtifactName::parse(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.store.read(&name).await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, "image/gif")], bytes).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(
                artifact = %name,
                error = &e as &(dyn std::error::Error + 'static),
                "Failed to read artifact"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
