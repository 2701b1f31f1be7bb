//! Client for the external reporting API that receives exported trees

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::tree::TreeNode;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;

/// Request body expected by the reporting API
#[derive(Debug, Serialize)]
struct ReportBody<'a> {
    value: &'a [TreeNode],
}

/// POST-only client for the reporting API
pub struct ReportClient {
    url: String,
    token: String,
    http_client: Client,
}

impl ReportClient {
    /// Create a new reporting client
    pub fn new(url: String, token: String) -> Self {
        Self {
            url,
            token,
            http_client: Client::new(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.url.clone(), config.token.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `{"value": tree}` to the API
    pub async fn push_tree(&self, tree: &[TreeNode]) -> Result<()> {
        debug!(url = %self.url, roots = tree.len(), "pushing tree");

        let response = self
            .http_client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .json(&ReportBody { value: tree })
            .send()
            .await?;

        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<()> {
    let status = response.status();

    if status.is_success() || status.is_redirection() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        body
    };

    Err(Error::ReportApi {
        status: status.as_u16(),
        message,
    })
}
