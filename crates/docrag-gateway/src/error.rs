use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docrag_core::{GenerationError, IngestError, QueryError};
use thiserror::Error;

use crate::handlers::QueryResponse;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Server(String),
}

/// Handler failure mapped onto an HTTP status and a `{detail}` body.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(detail) => detail_response(StatusCode::BAD_REQUEST, detail),
            Self::Ingest(e) => {
                tracing::warn!("upload rejected: {e}");
                detail_response(StatusCode::BAD_REQUEST, e.to_string())
            }
            Self::Query(QueryError::Generation(e)) => generation_failure(e),
            Self::Query(e @ QueryError::Retrieval(_)) => {
                tracing::error!("query failed: {e}");
                detail_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

fn detail_response(status: StatusCode, detail: String) -> Response {
    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
}

/// 502 with the error text plus whatever provenance the failed answer had.
fn generation_failure(err: GenerationError) -> Response {
    let detail = err.to_string();
    let body = QueryResponse::from_answer(err.into_fallback().into());
    let mut json = serde_json::to_value(body).unwrap_or_default();
    if let Some(obj) = json.as_object_mut() {
        obj.insert("detail".into(), detail.into());
    }
    (StatusCode::BAD_GATEWAY, Json(json)).into_response()
}
