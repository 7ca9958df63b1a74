use crate::category::Category;
use crate::credentials::Credentials;
use crate::error::{Result, ScanError};
use crate::fetcher::CategoryFetcher;
use crate::inventory::{FetchOutcome, Inventory};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, debug_span, info, warn};

/// Runs every category fetcher concurrently and collects their outcomes.
///
/// A failing fetcher only marks its own category as failed. The scan itself
/// fails only on problems that affect every category, such as incomplete
/// credentials.
pub struct Scanner {
    fetchers: Vec<Arc<dyn CategoryFetcher>>,
    span: Span,
}

impl Scanner {
    pub fn new(fetchers: Vec<Arc<dyn CategoryFetcher>>) -> Self {
        Self {
            fetchers,
            span: Span::none(),
        }
    }

    /// Parent span for every event this scanner emits.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn categories(&self) -> Vec<Category> {
        self.fetchers.iter().map(|f| f.category()).collect()
    }

    pub async fn scan(&self, credentials: &Credentials) -> Result<Inventory> {
        credentials.validate()?;
        info!(
            parent: &self.span,
            region = %credentials.region,
            categories = self.fetchers.len(),
            "Starting inventory scan"
        );

        let handles: Vec<(Category, JoinHandle<Result<Vec<serde_json::Value>>>)> = self
            .fetchers
            .iter()
            .map(|fetcher| {
                let fetcher = fetcher.clone();
                let credentials = credentials.clone();
                let category = fetcher.category();
                let span = debug_span!(parent: &self.span, "fetch", %category);
                let handle = tokio::spawn(
                    async move { fetcher.fetch(&credentials).await }.instrument(span),
                );
                (category, handle)
            })
            .collect();

        let mut inventory = Inventory::new();
        for (category, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(records)) => {
                    debug!(parent: &self.span, %category, records = records.len(), "Fetch complete");
                    FetchOutcome::Records(records)
                }
                Ok(Err(e)) => {
                    warn!(parent: &self.span, %category, error = %e, "Fetch failed");
                    FetchOutcome::Failed(e.to_string())
                }
                Err(e) => {
                    let e = ScanError::from(e);
                    warn!(parent: &self.span, %category, error = %e, "Fetch task failed");
                    FetchOutcome::Failed(e.to_string())
                }
            };
            if inventory.insert(category, outcome).is_some() {
                debug!(parent: &self.span, %category, "Duplicate fetcher, keeping last outcome");
            }
        }

        info!(
            parent: &self.span,
            failed = inventory.failures().count(),
            "Inventory scan complete"
        );
        Ok(inventory)
    }
}
