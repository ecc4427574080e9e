//! HTTP client for the inspection API
//!
//! Every request carries the configured bearer token when one is set.
//! Failures are reported with `anyhow` context; callers decide whether
//! they are surfaced to the user.

use super::traits::ApiClientTrait;
use crate::config::TuiConfig;
use crate::session::SessionValidator;
use crate::state::{DataSource, ResponseDocument, ResponseStatus, Template};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

/// Default API address
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:3000/api";

/// Environment variable overriding the configured address
const ADDRESS_ENV: &str = "INSPECTION_API_ADDRESS";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct SessionStatus {
    valid: bool,
}

/// Client for the templates, data-source, response and auth endpoints
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client from the user configuration and environment
    pub fn new(config: &TuiConfig) -> Result<Self> {
        let address = resolve_address(
            std::env::var(ADDRESS_ENV).ok(),
            config.api_base_url.as_deref(),
        );
        Self::with_address(address, config.access_token.clone())
    }

    pub fn with_address(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(self.url(path)))
    }

    async fn send_document(&self, path: &str, document: &ResponseDocument) -> Result<()> {
        let response = self
            .post(path)
            .json(document)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach API: {}", e))?;

        response
            .error_for_status()
            .map_err(|e| anyhow!("Failed to store {} response: {}", document.status.label(), e))?;

        tracing::info!(
            template_id = %document.template_id,
            status = document.status.label(),
            answers = document.responses.len(),
            "response stored"
        );
        Ok(())
    }
}

/// Newest draft among the stored responses
fn newest_draft(documents: Vec<ResponseDocument>) -> Option<ResponseDocument> {
    documents
        .into_iter()
        .filter(|d| d.status == ResponseStatus::Draft)
        .max_by_key(|d| d.submitted_at)
}

/// Pick the API address: environment first, then config, then default
fn resolve_address(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|a| !a.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string())
}

#[async_trait]
impl ApiClientTrait for ApiClient {
    async fn list_templates(&self) -> Result<Vec<Template>> {
        let response = self
            .get("templates")
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach API: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to list templates: {}", e))?;

        let templates: Vec<Template> = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to read templates: {}", e))?;

        tracing::debug!(count = templates.len(), "templates loaded");
        Ok(templates)
    }

    async fn fetch_data_source(&self, source: DataSource) -> Result<Vec<String>> {
        let response = self
            .get(&format!("data-sources/{}", source.as_str()))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach API: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to load {} list: {}", source.as_str(), e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to read {} list: {}", source.as_str(), e))
    }

    async fn latest_draft(&self, template_id: &str) -> Result<Option<ResponseDocument>> {
        let response = self
            .get("responses/drafts")
            .query(&[("templateId", template_id)])
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach API: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to list drafts: {}", e))?;

        let drafts: Vec<ResponseDocument> = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to read drafts: {}", e))?;

        tracing::debug!(template_id, count = drafts.len(), "drafts loaded");
        Ok(newest_draft(drafts))
    }

    async fn save_draft(&self, document: &ResponseDocument) -> Result<()> {
        self.send_document("responses/drafts", document).await
    }

    async fn submit_response(&self, document: &ResponseDocument) -> Result<()> {
        self.send_document("responses", document).await
    }
}

#[async_trait]
impl SessionValidator for ApiClient {
    /// `Ok(false)` for a rejected session, `Err` when the API is unreachable
    async fn validate_session(&self) -> Result<bool> {
        let response = self
            .get("auth/validate-session")
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach API: {}", e))?;

        if !response.status().is_success() {
            tracing::info!(status = %response.status(), "session rejected");
            return Ok(false);
        }

        let status: SessionStatus = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to read session status: {}", e))?;
        Ok(status.valid)
    }
}
