use crate::error::{CoreError, Result};
use crate::model::ScanResult;
use cloudscope_scanner::Credentials;
use cloudscope_scanner::fetcher::{base_url, build_client};
use reqwest::Client;
use serde::Deserialize;
use tracing::{Span, debug, info};
use url::Url;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a scan service that does the fetching and normalizing itself
/// and answers with a finished `{nodes, links}` graph.
pub struct RemoteScanClient {
    client: Client,
    base: Url,
    span: Span,
}

impl RemoteScanClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base: base_url(endpoint)?,
            span: Span::none(),
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn scan_url(&self) -> Result<Url> {
        self.base
            .join("scan")
            .map_err(|e| CoreError::from(cloudscope_scanner::ScanError::InvalidEndpoint(e.to_string())))
    }

    /// POSTs the credentials to `/scan`. Any non-2xx answer becomes a single
    /// [`CoreError::Remote`] carrying the service's `error` message.
    pub async fn scan(&self, credentials: &Credentials) -> Result<ScanResult> {
        credentials.validate()?;
        let url = self.scan_url()?;
        info!(parent: &self.span, %url, region = %credentials.region, "Requesting remote scan");

        let response = self.client.post(url).json(credentials).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| {
                    if body.trim().is_empty() {
                        status.canonical_reason().unwrap_or("no response body").to_string()
                    } else {
                        body.trim().to_string()
                    }
                });
            return Err(CoreError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let result: ScanResult = serde_json::from_str(&body)?;
        debug!(
            parent: &self.span,
            nodes = result.nodes.len(),
            links = result.links.len(),
            "Remote scan complete"
        );
        Ok(result)
    }
}
