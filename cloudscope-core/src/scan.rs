use crate::error::Result;
use crate::model::{ScanResult, ScanSummary};
use crate::normalize::Normalizer;
use crate::remote::RemoteScanClient;
use cloudscope_scanner::{CategoryFetcher, Credentials, FileFetcher, GatewayFetcher, Scanner};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Span, info};

/// Where inventory comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanSource {
    /// Provider CLI JSON exports (`ec2.json`, `s3.json`, ...).
    Directory(PathBuf),
    /// Inventory gateway answering `POST <endpoint>/<category>`.
    Gateway(String),
    /// Scan service answering `POST <endpoint>/scan` with a finished graph.
    Remote(String),
}

impl ScanSource {
    pub fn describe(&self) -> String {
        match self {
            ScanSource::Directory(dir) => format!("directory {}", dir.display()),
            ScanSource::Gateway(url) => format!("gateway {}", url),
            ScanSource::Remote(url) => format!("remote {}", url),
        }
    }
}

/// Options for configuring a scan
pub struct ScanOptions {
    pub source: ScanSource,
    pub credentials: Credentials,
    pub timeout_secs: u64,
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub result: ScanResult,
    pub summary: ScanSummary,
}

/// Execute a scan with the given options.
///
/// Directory and gateway sources are fetched per category, concurrently, and
/// normalized here; a remote source returns an already normalized graph.
pub async fn execute_scan(options: ScanOptions, span: Span) -> Result<ScanOutput> {
    let ScanOptions {
        source,
        credentials,
        timeout_secs,
        show_progress,
    } = options;

    let progress = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Scanning {}...", source.describe()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    info!(parent: &span, source = %source.describe(), "Scan started");
    let outcome = run(&source, credentials, timeout_secs, &span).await;

    if let Some(pb) = progress {
        match outcome {
            Ok(ref out) => pb.finish_with_message(format!(
                "Scan complete: {} resources, {} failed categories",
                out.summary.total(),
                out.summary.failures.len()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }
    outcome
}

async fn run(
    source: &ScanSource,
    credentials: Credentials,
    timeout_secs: u64,
    span: &Span,
) -> Result<ScanOutput> {
    let fetchers: Vec<Arc<dyn CategoryFetcher>> = match source {
        ScanSource::Remote(endpoint) => {
            let client = RemoteScanClient::new(endpoint, timeout_secs)?.with_span(span.clone());
            let result = client.scan(&credentials).await?;
            let summary = ScanSummary::for_result(&result, credentials.region.as_str());
            return Ok(ScanOutput { result, summary });
        }
        ScanSource::Gateway(endpoint) => GatewayFetcher::all(endpoint, timeout_secs)?,
        ScanSource::Directory(dir) => FileFetcher::all(dir),
    };

    // Exports on disk need no secrets; keep whatever region was given.
    let credentials = match source {
        ScanSource::Directory(_) if credentials.validate().is_err() => {
            let region = if credentials.region.trim().is_empty() {
                "local".to_string()
            } else {
                credentials.region.clone()
            };
            Credentials::new("offline", "offline", region)
        }
        _ => credentials,
    };

    let scanner = Scanner::new(fetchers).with_span(span.clone());
    let inventory = scanner.scan(&credentials).await?;
    let (result, summary) = Normalizer::new()
        .with_span(span.clone())
        .normalize_with_summary(&inventory, &credentials.region);
    Ok(ScanOutput { result, summary })
}
