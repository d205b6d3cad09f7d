//! HTTP API surface using axum.
//!
//! Endpoints:
//! - GET    /health         - health check (public)
//! - POST   /add            - ingest a document
//! - POST   /search         - nearest-neighbor search
//! - POST   /compare        - similarity of two texts
//! - GET    /documents      - list stored documents
//! - DELETE /documents/:id  - delete one document
//! - DELETE /clear          - delete every document
//!
//! Everything except /health requires the shared secret, passed as an
//! `X-API-Key` header or an `api_key` query parameter and compared by exact
//! string match.

pub mod error;

use crate::domain::entities::document::preview;
use crate::DocSim;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::server::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub docsim: Arc<DocSim>,
    pub api_key: Arc<String>,
}

/// Build the axum router with all endpoints.
pub fn router(docsim: Arc<DocSim>, api_key: String) -> Router {
    let state = AppState {
        docsim,
        api_key: Arc::new(api_key),
    };
    let protected = Router::new()
        .route("/add", post(add))
        .route("/search", post(search))
        .route("/compare", post(compare))
        .route("/documents", get(documents))
        .route("/documents/:id", delete(delete_document))
        .route("/clear", delete(clear))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(docsim: Arc<DocSim>, addr: &str, api_key: String) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "listening");
    axum::serve(listener, router(docsim, api_key)).await
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AuthParams {
    api_key: Option<String>,
}

async fn require_api_key(
    State(state): State<AppState>,
    Query(params): Query<AuthParams>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let provided = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(params.api_key);

    match provided {
        Some(key) if key == *state.api_key => next.run(request).await,
        _ => ApiError::Unauthorized.into_response(),
    }
}

// ── Request / Response types ────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub documents: usize,
}

#[derive(Deserialize)]
pub struct AddRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
pub struct AddResponse {
    pub message: String,
    pub id: String,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_n_results")]
    pub n_results: usize,
}

fn default_n_results() -> usize {
    5
}

#[derive(Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultDto>,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SearchResultDto {
    pub id: String,
    pub similarity: f64,
    pub content: String,
    pub metadata: serde_json::Value,
}

#[derive(Deserialize)]
pub struct CompareRequest {
    pub doc1: String,
    pub doc2: String,
}

#[derive(Serialize, Deserialize)]
pub struct CompareResponse {
    pub similarity: f64,
    pub percentage: f64,
    pub doc1_preview: String,
    pub doc2_preview: String,
}

#[derive(Serialize, Deserialize)]
pub struct DocumentDto {
    pub id: String,
    pub content: String,
    pub metadata: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentDto>,
    pub count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let stats = state.docsim.stats()?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        documents: stats.total_documents,
    }))
}

async fn add(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<(StatusCode, Json<AddResponse>), ApiError> {
    let outcome = state.docsim.ingest(&req.content, req.metadata).await?;
    let (status, message) = if outcome.inserted {
        (StatusCode::CREATED, "Document added")
    } else {
        (StatusCode::OK, "Document already exists")
    };
    Ok((
        status,
        Json(AddResponse {
            message: message.to_string(),
            id: outcome.id.to_string(),
        }),
    ))
}

async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = state.docsim.search(&req.query, req.n_results).await?;
    let message = results
        .store_empty
        .then(|| "No documents in database".to_string());
    Ok(Json(SearchResponse {
        results: results
            .hits
            .into_iter()
            .map(|hit| SearchResultDto {
                id: hit.document.id.to_string(),
                similarity: hit.similarity,
                content: hit.document.content,
                metadata: hit.document.metadata,
            })
            .collect(),
        query: req.query,
        message,
    }))
}

async fn compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, ApiError> {
    let similarity = state.docsim.compare(&req.doc1, &req.doc2).await?;
    Ok(Json(CompareResponse {
        similarity,
        percentage: similarity * 100.0,
        doc1_preview: preview(&req.doc1, 100),
        doc2_preview: preview(&req.doc2, 100),
    }))
}

async fn documents(State(state): State<AppState>) -> Result<Json<DocumentsResponse>, ApiError> {
    let docs = state.docsim.documents(None)?;
    let documents: Vec<DocumentDto> = docs
        .into_iter()
        .map(|d| DocumentDto {
            id: d.id.to_string(),
            content: d.content,
            metadata: d.metadata,
            created_at: d.created_at,
        })
        .collect();
    let count = documents.len();
    Ok(Json(DocumentsResponse { documents, count }))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.docsim.delete_document(&id)?;
    let message = if deleted {
        "Document deleted"
    } else {
        "Document not found"
    };
    Ok(Json(DeleteResponse {
        message: message.to_string(),
        deleted,
    }))
}

async fn clear(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    state.docsim.clear()?;
    Ok(Json(ClearResponse {
        message: "Database cleared".to_string(),
    }))
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ingest::DuplicatePolicy;
    use crate::domain::error::DomainError;
    use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const KEY: &str = "test-secret";

    /// Deterministic stand-in for a real embedding model.
    struct StubProvider;

    fn vectorize(text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += b as f32 / 255.0;
        }
        v
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for StubProvider {
        async fn embed(
            &self,
            texts: &[String],
            _input_type: InputType,
        ) -> Result<Vec<Vec<f32>>, DomainError> {
            Ok(texts.iter().map(|t| vectorize(t)).collect())
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    fn test_app() -> Router {
        let docsim =
            DocSim::with_providers(":memory:", Arc::new(StubProvider), DuplicatePolicy::Keep)
                .unwrap();
        router(Arc::new(docsim), KEY.to_string())
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-api-key", KEY)
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: Response) -> T {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let health: HealthResponse = body_json(resp).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.documents, 0);
    }

    #[tokio::test]
    async fn test_missing_key_rejected() {
        let app = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/add")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"content":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let app = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/add")
                    .header("content-type", "application/json")
                    .header("x-api-key", "not-the-key")
                    .body(Body::from(r#"{"content":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_query_param_key_accepted() {
        let app = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/documents?api_key={KEY}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let docs: DocumentsResponse = body_json(resp).await;
        assert_eq!(docs.count, 0);
    }

    #[tokio::test]
    async fn test_add_then_duplicate() {
        let app = test_app();

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/add",
                serde_json::json!({"content": "The sky is blue."}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let first: AddResponse = body_json(resp).await;
        assert_eq!(first.message, "Document added");

        let resp = app
            .oneshot(json_request(
                "POST",
                "/add",
                serde_json::json!({"content": "The sky is blue.", "metadata": {"tag": "weather"}}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let second: AddResponse = body_json(resp).await;
        assert_eq!(second.message, "Document already exists");
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_add_empty_content_bad_request() {
        let app = test_app();
        let resp = app
            .oneshot(json_request(
                "POST",
                "/add",
                serde_json::json!({"content": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let app = test_app();
        let resp = app
            .oneshot(json_request(
                "POST",
                "/search",
                serde_json::json!({"query": "anything"}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let search: SearchResponse = body_json(resp).await;
        assert!(search.results.is_empty());
        assert_eq!(search.message.as_deref(), Some("No documents in database"));
    }

    #[tokio::test]
    async fn test_search_returns_hits() {
        let app = test_app();
        for content in ["alpha document", "beta document"] {
            let resp = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/add",
                    serde_json::json!({"content": content}),
                ))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = app
            .oneshot(json_request(
                "POST",
                "/search",
                serde_json::json!({"query": "alpha document", "n_results": 1}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let search: SearchResponse = body_json(resp).await;
        assert_eq!(search.results.len(), 1);
        assert_eq!(search.results[0].content, "alpha document");
        assert!(search.results[0].similarity > 0.99);
    }

    #[tokio::test]
    async fn test_compare() {
        let app = test_app();
        let resp = app
            .oneshot(json_request(
                "POST",
                "/compare",
                serde_json::json!({"doc1": "same text", "doc2": "same text"}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let cmp: CompareResponse = body_json(resp).await;
        assert!((cmp.similarity - 1.0).abs() < 1e-6);
        assert_eq!(cmp.doc1_preview, "same text");
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let app = test_app();
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/add",
                serde_json::json!({"content": "to be deleted"}),
            ))
            .await
            .unwrap();
        let added: AddResponse = body_json(resp).await;

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/documents/{}", added.id))
                    .header("x-api-key", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let del: DeleteResponse = body_json(resp).await;
        assert!(del.deleted);

        // Deleting again is a no-op, not an error.
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/documents/{}", added.id))
                    .header("x-api-key", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let del: DeleteResponse = body_json(resp).await;
        assert!(!del.deleted);

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/clear")
                    .header("x-api-key", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared: ClearResponse = body_json(resp).await;
        assert_eq!(cleared.message, "Database cleared");
    }
}
