// Upstream client directory calls
//
// The directory API authenticates with a Basic header built from the api key
// plus a trailing colon, base64 encoded. Depending on deployment the search
// endpoint answers either a bare array of clients or `{"clients": [...]}`;
// both shapes are accepted.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use bookline_core::{BookingError, ClientDirectory, ClientSummary};

/// Errors from an upstream directory call.
///
/// The upstream status is preserved so the proxy route can forward it.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("directory unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

/// One row as the upstream returns it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamClient {
    id: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    mobile_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpstreamBody {
    Wrapped { clients: Vec<UpstreamClient> },
    Bare(Vec<UpstreamClient>),
}

/// HTTP client for the upstream directory.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
    business_id: String,
    auth_header: String,
}

impl DirectoryClient {
    pub fn new(
        base_url: impl Into<String>,
        business_id: impl Into<String>,
        api_key: &str,
    ) -> Self {
        let token = BASE64.encode(format!("{api_key}:"));
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            business_id: business_id.into(),
            auth_header: format!("Basic {token}"),
        }
    }

    /// Search the directory, preserving the upstream status on failure.
    pub async fn search_clients(&self, query: &str) -> Result<Vec<ClientSummary>, DirectoryError> {
        let url = format!(
            "{}/{}/client",
            self.base_url.trim_end_matches('/'),
            self.business_id
        );
        debug!(%url, query, "Searching client directory");

        let response = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: UpstreamBody = response.json().await?;
        let rows = match body {
            UpstreamBody::Wrapped { clients } => clients,
            UpstreamBody::Bare(clients) => clients,
        };

        Ok(rows
            .into_iter()
            .map(|row| ClientSummary {
                id: row.id,
                name: row.name,
                email: row.email,
                mobile_phone: row.mobile_phone,
            })
            .collect())
    }
}

#[async_trait]
impl ClientDirectory for DirectoryClient {
    async fn search(&self, query: &str) -> bookline_core::Result<Vec<ClientSummary>> {
        self.search_clients(query)
            .await
            .map_err(|e| BookingError::directory(e.to_string()))
    }
}
