// Client search proxy route

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use bookline_core::ClientSummary;

use crate::directory::{DirectoryClient, DirectoryError};

/// App state
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryClient>,
}

/// Request to search the client directory
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchClientsRequest {
    pub q: String,
}

/// Matching clients
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchClientsResponse {
    pub clients: Vec<ClientSummary>,
}

/// Error body, mirroring the upstream's `{"error": ...}` shape
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create client routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/clients/search", post(search_clients))
        .with_state(state)
}

/// POST /v1/clients/search - Proxy a text search to the client directory
#[utoipa::path(
    post,
    path = "/v1/clients/search",
    request_body = SearchClientsRequest,
    responses(
        (status = 200, description = "Matching clients", body = SearchClientsResponse),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 502, description = "Directory unreachable", body = ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn search_clients(
    State(state): State<AppState>,
    Json(req): Json<SearchClientsRequest>,
) -> Result<Json<SearchClientsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = req.q.trim();
    if query.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Missing query parameter q",
        ));
    }

    match state.directory.search_clients(query).await {
        Ok(clients) => Ok(Json(SearchClientsResponse { clients })),
        Err(DirectoryError::Upstream { status, body }) => {
            tracing::error!(status, "Client directory returned an error");
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err(error_response(status, body))
        }
        Err(err @ DirectoryError::Network(_)) => {
            tracing::error!(error = %err, "Client directory unreachable");
            Err(error_response(StatusCode::BAD_GATEWAY, err.to_string()))
        }
    }
}

fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
