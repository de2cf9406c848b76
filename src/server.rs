//! HTTP boundary: a single `POST /ask` route over the pipeline.
//!
//! The handler owns request parsing, error-to-status mapping, and CORS; the
//! core never sees transport concerns. CORS is permissive for all routes,
//! matching the browser-facing deployments this serves.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::service::QaService;
use crate::types::QaError;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the application router around a fully initialized service.
pub fn router(service: Arc<QaService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(service)
}

async fn ask(
    State(service): State<Arc<QaService>>,
    Json(body): Json<AskRequest>,
) -> Response {
    // A missing question field is the same request-level failure as an empty
    // one; the core rejects both before touching any capability.
    let question = body.question.unwrap_or_default();

    match service.answer_question(&question).await {
        Ok(answer) => (StatusCode::OK, Json(AskResponse { answer })).into_response(),
        Err(err) => {
            let status = status_for(&err);
            warn!(%err, %status, "request failed");
            (
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn status_for(err: &QaError) -> StatusCode {
    match err {
        QaError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        QaError::RetrievalUnavailable(_) | QaError::GenerationUnavailable(_) => {
            StatusCode::BAD_GATEWAY
        }
        QaError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{EmbeddingError, GenerationError};
    use crate::index::IndexError;

    #[test]
    fn error_variants_map_to_expected_statuses() {
        assert_eq!(
            status_for(&QaError::InvalidArgument("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&QaError::RetrievalUnavailable(EmbeddingError::Status {
                status: 503,
                body: String::new(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&QaError::GenerationUnavailable(GenerationError::Status {
                status: 500,
                body: String::new(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&QaError::Index(IndexError::EmptyIndex)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
