//! Reqwest-based client for the remote execution service.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::protocol::{
    ExampleResponse, ExecutionRequest, ExecutionResponse, RunError, WireResponse,
};
use crate::run::ExecutionBackend;

#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let timeout = cfg.get_usize("REQUEST_TIMEOUT").unwrap_or(60) as u64;
        let base_url = cfg
            .get("SERVICE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:5000".into());
        Self::new(base_url, Duration::from_secs(timeout))
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Fetch a bundled example program by name.
    pub async fn fetch_example(&self, name: &str) -> Result<String> {
        let url = format!("{}/examples/{}", self.base_url, name);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("failed to reach the execution service")?;
        let body: ExampleResponse = resp
            .json()
            .await
            .context("malformed example response")?;
        // a miss may carry both keys ({"code": "", "error": …}); an empty
        // code field defers to whatever error came with it
        match (body.code, body.error) {
            (Some(code), _) if !code.is_empty() => Ok(code),
            (_, Some(error)) => Err(anyhow::anyhow!(error)),
            (Some(code), None) => Ok(code),
            (None, None) => Err(anyhow::anyhow!("empty example response")),
        }
    }
}

impl ExecutionBackend for ServiceClient {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, RunError> {
        let url = format!("{}/run", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RunError::Transport(e.to_string()))?;
        // error responses still carry the JSON shape, so read the body
        // regardless of status and let classification sort it out
        let body = resp
            .text()
            .await
            .map_err(|e| RunError::Transport(e.to_string()))?;
        let wire: WireResponse = serde_json::from_str(&body)
            .map_err(|e| RunError::Transport(format!("malformed response: {}", e)))?;
        wire.classify()
    }
}
