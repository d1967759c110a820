use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, query_handler, root_handler, upload_handler};
use super::server::AppState;

/// Routes are served with and without a trailing slash.
#[must_use]
pub fn build_router(state: AppState, max_body_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/upload", post(upload_handler))
        .route("/upload/", post(upload_handler))
        .route("/query", post(query_handler))
        .route("/query/", post(query_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::Body;
    use axum::http::Request;
    use docrag_core::{AppContext, Config};
    use docrag_llm::any::AnyProvider;
    use docrag_llm::mock::MockProvider;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "docrag-test-boundary";

    fn make_router(dir: &Path, provider: MockProvider, max_body: usize) -> Router {
        let mut config = Config::default();
        config.index.persist_dir = dir.join("pdf-embeddings");
        let context = AppContext::build(&config, AnyProvider::Mock(provider)).unwrap();
        build_router(AppState::new(context, dir.join("uploaded_files")), max_body)
    }

    fn multipart_request(filename: &str, content_type: &str, body: &[u8]) -> Request<Body> {
        let mut payload = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        payload.extend_from_slice(body);
        payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(payload))
            .unwrap()
    }

    fn query_request(form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/query/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 1_048_576);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["index_ready"], false);
    }

    #[tokio::test]
    async fn root_responds() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 1_048_576);
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn upload_then_query() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::with_responses(vec!["Refunds take 14 days.".into()]);
        let app = make_router(dir.path(), provider.clone(), 1_048_576);

        let resp = app
            .clone()
            .oneshot(multipart_request(
                "policy.txt",
                "text/plain",
                b"Refunds are processed within 14 days.",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["filename"], "policy.txt");
        assert_eq!(json["chunks"], 1);
        assert!(dir.path().join("uploaded_files/policy.txt").exists());

        let resp = app
            .oneshot(query_request("query=What+is+the+refund+policy%3F"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["response"], "Refunds take 14 days.");
        assert_eq!(json["paragraph"], "Refunds are processed within 14 days.");
        assert_eq!(json["documentName"], "policy.txt");
        assert_eq!(json["webViewLink"], "");
        assert!(provider.prompts()[0].contains("What is the refund policy?"));
    }

    #[tokio::test]
    async fn unsupported_upload_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 1_048_576);

        let resp = app
            .oneshot(multipart_request("bundle.zip", "application/zip", b"PK\x03\x04"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let json = json_body(resp).await;
        assert!(json["detail"].as_str().unwrap().contains("application/zip"));
        assert!(!dir.path().join("pdf-embeddings").exists());
    }

    #[tokio::test]
    async fn missing_file_field_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 1_048_576);
        let payload = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(payload))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn query_on_empty_index_returns_not_found_message() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 1_048_576);

        let resp = app.oneshot(query_request("query=anything")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(
            json["response"],
            "I'm sorry, but I couldn't find that information in the uploaded document."
        );
        assert!(json["source"].is_null());
    }

    #[tokio::test]
    async fn generation_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::failing(), 1_048_576);

        let resp = app
            .clone()
            .oneshot(multipart_request("policy.txt", "text/plain", b"Refund policy text."))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let resp = app.oneshot(query_request("query=refund")).await.unwrap();
        assert_eq!(resp.status(), 502);
        let json = json_body(resp).await;
        assert_eq!(json["detail"], "Error generating response: mock LLM error");
        assert_eq!(json["paragraph"], "Refund policy text.");
    }

    #[tokio::test]
    async fn zero_k_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 1_048_576);
        let resp = app.oneshot(query_request("query=q&k=0")).await.unwrap();
        assert_eq!(resp.status(), 500);
    }

    #[tokio::test]
    async fn blank_query_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 1_048_576);
        let resp = app.oneshot(query_request("query=+++")).await.unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn body_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(dir.path(), MockProvider::default(), 64);
        let oversized = format!("query={}", "a".repeat(128));
        let resp = app.oneshot(query_request(&oversized)).await.unwrap();
        assert_eq!(resp.status(), 413);
    }
}
