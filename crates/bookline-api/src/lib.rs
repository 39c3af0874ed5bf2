// Bookline client-directory proxy
//
// One job: let the booking UI search the business's client directory without
// ever shipping the directory credential to the browser.

pub mod clients;
pub mod config;
pub mod directory;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bookline_core::ClientSummary;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(clients::search_clients),
    components(schemas(
        ClientSummary,
        clients::SearchClientsRequest,
        clients::SearchClientsResponse,
        clients::ErrorResponse,
    )),
    tags(
        (name = "clients", description = "Client directory search endpoints")
    ),
    info(
        title = "Bookline API",
        version = "0.1.0",
        description = "Client directory search proxy for the Bookline booking flow",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

/// Assemble the service router
pub fn app(state: clients::AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .merge(clients::routes(state))
}
