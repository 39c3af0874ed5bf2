// Environment-driven configuration for the proxy service

use anyhow::{Context, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DIRECTORY_URL: &str = "https://sandbox.joinblvd.com/api/2020-01";

/// Service configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to (`BIND_ADDR`)
    pub bind_addr: String,
    /// Base URL of the upstream client directory (`DIRECTORY_API_URL`)
    pub directory_url: String,
    /// Business id the directory is scoped to (`BOOKING_BUSINESS_ID`)
    pub business_id: String,
    /// Directory API key, used for the Basic authorization header
    /// (`DIRECTORY_API_KEY`)
    pub api_key: String,
    /// Allowed CORS origins (`CORS_ALLOWED_ORIGINS`, comma separated);
    /// empty means same-origin only
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let directory_url = std::env::var("DIRECTORY_API_URL")
            .unwrap_or_else(|_| DEFAULT_DIRECTORY_URL.to_string());
        let business_id = std::env::var("BOOKING_BUSINESS_ID")
            .context("BOOKING_BUSINESS_ID environment variable required")?;
        let api_key = std::env::var("DIRECTORY_API_KEY")
            .context("DIRECTORY_API_KEY environment variable required")?;

        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            directory_url,
            business_id,
            api_key,
            cors_origins,
        })
    }
}
