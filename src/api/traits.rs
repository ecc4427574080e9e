//! Trait abstraction for the API client to enable mocking in tests

use crate::state::{DataSource, ResponseDocument, Template};
use anyhow::Result;
use async_trait::async_trait;

/// Remote operations the application depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClientTrait: Send + Sync {
    /// List the available form templates
    async fn list_templates(&self) -> Result<Vec<Template>>;

    /// Fetch the suggestion list behind an autocomplete field
    async fn fetch_data_source(&self, source: DataSource) -> Result<Vec<String>>;

    /// Most recent stored draft for a template, if any
    async fn latest_draft(&self, template_id: &str) -> Result<Option<ResponseDocument>>;

    /// Store a draft response
    async fn save_draft(&self, document: &ResponseDocument) -> Result<()>;

    /// Store a completed response
    async fn submit_response(&self, document: &ResponseDocument) -> Result<()>;
}
