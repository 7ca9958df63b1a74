use crate::category::Category;
use crate::credentials::Credentials;
use crate::envelope::extract_records;
use crate::error::{Result, ScanError};
use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches the provider-native records of a single category.
///
/// Implementations must not swallow failures: an `Err` is what lets the
/// scanner isolate a failed category from the others.
pub trait CategoryFetcher: Send + Sync {
    fn category(&self) -> Category;

    fn fetch<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, Result<Vec<Value>>>;
}

/// Reads provider CLI JSON exports (`ec2.json`, `s3.json`, ...) from a directory.
pub struct FileFetcher {
    dir: PathBuf,
    category: Category,
}

impl FileFetcher {
    pub fn new(dir: impl Into<PathBuf>, category: Category) -> Self {
        Self {
            dir: dir.into(),
            category,
        }
    }

    /// One fetcher per scannable category, all reading from `dir`.
    pub fn all(dir: &Path) -> Vec<Arc<dyn CategoryFetcher>> {
        Category::ALL
            .into_iter()
            .map(|category| Arc::new(FileFetcher::new(dir, category)) as Arc<dyn CategoryFetcher>)
            .collect()
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.category.slug()))
    }
}

impl CategoryFetcher for FileFetcher {
    fn category(&self) -> Category {
        self.category
    }

    fn fetch<'a>(&'a self, _credentials: &'a Credentials) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            let path = self.path();
            debug!("Reading {} export from {}", self.category, path.display());
            let content = tokio::fs::read_to_string(&path).await?;
            let body: Value = serde_json::from_str(&content)?;
            extract_records(self.category, body)
        })
    }
}

/// Posts credentials to `<endpoint>/<category>` of an inventory gateway and
/// unwraps the list-API envelope from the JSON response.
pub struct GatewayFetcher {
    client: Client,
    endpoint: Url,
    category: Category,
}

impl GatewayFetcher {
    pub fn new(client: Client, endpoint: &str, category: Category) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: base_url(endpoint)?,
            category,
        })
    }

    /// One fetcher per scannable category sharing a single connection pool.
    pub fn all(endpoint: &str, timeout_secs: u64) -> Result<Vec<Arc<dyn CategoryFetcher>>> {
        let client = build_client(timeout_secs)?;
        Category::ALL
            .into_iter()
            .map(|category| {
                GatewayFetcher::new(client.clone(), endpoint, category)
                    .map(|f| Arc::new(f) as Arc<dyn CategoryFetcher>)
            })
            .collect()
    }

    pub fn url(&self) -> Result<Url> {
        self.endpoint
            .join(self.category.slug())
            .map_err(|e| ScanError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))
    }
}

impl CategoryFetcher for GatewayFetcher {
    fn category(&self) -> Category {
        self.category
    }

    fn fetch<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            let url = self.url()?;
            debug!("Fetching {} inventory from {}", self.category, url);

            let response = self.client.post(url).json(credentials).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ScanError::UpstreamStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            let body: Value = response.json().await?;
            extract_records(self.category, body)
        })
    }
}

/// Shared HTTP client configuration for gateway and remote scan calls.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("cloudscope/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()?;
    Ok(client)
}

/// Parses an endpoint and makes sure relative joins append to its path.
pub fn base_url(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| ScanError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
    if url.cannot_be_a_base() {
        return Err(ScanError::InvalidEndpoint(endpoint.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
