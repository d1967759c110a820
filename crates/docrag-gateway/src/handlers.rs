use std::path::Path;

use axum::Json;
use axum::extract::{Form, Multipart, State};
use docrag_core::{ChunkAnnotations, QueryAnswer};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppState;

const UPLOAD_FIELD: &str = "file";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Serialize)]
pub(crate) struct UploadResponse {
    status: &'static str,
    message: &'static str,
    filename: String,
    content_type: String,
    location: String,
    chunks: usize,
}

#[derive(Deserialize)]
pub(crate) struct QueryForm {
    pub query: String,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryResponse {
    response: String,
    source: Option<String>,
    paragraph: Option<String>,
    /// Empty string when the passage did not come from Drive.
    web_view_link: String,
    document_name: Option<String>,
}

impl QueryResponse {
    pub(crate) fn from_answer(answer: QueryAnswer) -> Self {
        Self {
            response: answer.response_text,
            source: answer.source,
            paragraph: answer.excerpt,
            web_view_link: answer.web_view_link.unwrap_or_default(),
            document_name: answer.document_name,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    index_ready: bool,
}

#[derive(Serialize)]
pub(crate) struct RootResponse {
    message: &'static str,
}

/// Keep only the final path component so uploads cannot escape `upload_dir`.
fn sanitize_file_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .map(str::to_owned)
}

pub(crate) async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .and_then(sanitize_file_name)
            .ok_or_else(|| ApiError::BadRequest("upload has no usable file name".into()))?;
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        tokio::fs::create_dir_all(&state.upload_dir)
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to save file: {e}")))?;
        let location = state.upload_dir.join(&filename);
        tokio::fs::write(&location, &bytes)
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to save file: {e}")))?;
        tracing::info!(%filename, %content_type, bytes = bytes.len(), "upload saved");

        let report = state
            .context
            .ingest
            .ingest_file(
                &location,
                &content_type,
                ChunkAnnotations {
                    document_name: Some(filename.clone()),
                    web_view_link: None,
                },
            )
            .await?;

        return Ok(Json(UploadResponse {
            status: "success",
            message: "File uploaded successfully",
            filename,
            content_type,
            location: location.display().to_string(),
            chunks: report.chunks,
        }));
    }

    Err(ApiError::BadRequest(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}

pub(crate) async fn query_handler(
    State(state): State<AppState>,
    Form(form): Form<QueryForm>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = form.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }
    let answer = state.context.query.answer(query, form.k).await?;
    Ok(Json(QueryResponse::from_answer(answer)))
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        index_ready: state.context.index.exists(),
    })
}

pub(crate) async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "docrag server is running",
    })
}
