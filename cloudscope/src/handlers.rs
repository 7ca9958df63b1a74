use clap::ArgMatches;
use cloudscope_core::report::{
    ReportFormat, generate_html_report, generate_json_report, generate_svg_report,
    generate_text_report, save_report,
};
use cloudscope_core::scan::{ScanOptions, ScanSource, execute_scan};
use cloudscope_core::{AppConfig, Credentials, LayoutConfig, ScanConfig, ScanResult, ScanSummary};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

// Helper functions for scan handler

/// Pick the scan source from the command line, falling back to the config file.
pub fn resolve_source(
    source: Option<&PathBuf>,
    gateway: Option<&String>,
    remote: Option<&String>,
    config: &ScanConfig,
) -> Result<ScanSource, String> {
    if let Some(dir) = source {
        return Ok(ScanSource::Directory(expand_path(dir)));
    }
    if let Some(url) = gateway {
        return Ok(ScanSource::Gateway(url.clone()));
    }
    if let Some(url) = remote {
        return Ok(ScanSource::Remote(url.clone()));
    }

    if let Some(dir) = &config.source_dir {
        Ok(ScanSource::Directory(expand_path(Path::new(dir))))
    } else if let Some(url) = &config.gateway {
        Ok(ScanSource::Gateway(url.clone()))
    } else if let Some(url) = &config.remote {
        Ok(ScanSource::Remote(url.clone()))
    } else {
        Err("One of --source, --gateway or --remote must be provided".to_string())
    }
}

/// Build credentials; the region falls back to the configured one.
pub fn resolve_credentials(
    access_key: Option<&String>,
    secret_key: Option<&String>,
    region: Option<&String>,
    config: &ScanConfig,
) -> Credentials {
    Credentials::new(
        access_key.cloned().unwrap_or_default(),
        secret_key.cloned().unwrap_or_default(),
        region.cloned().unwrap_or_else(|| config.region.clone()),
    )
}

/// Load a saved scan: either a bare graph or a JSON report wrapping one.
///
/// A report's saved summary (scan id, region, scan time and failed
/// categories) is kept; counts are recomputed from the graph.
pub fn load_scan_file(path: &Path) -> Result<(ScanResult, ScanSummary), String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read scan file {}: {}", path.display(), e))?;
    let mut value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;

    let saved = value.pointer_mut("/report/summary").map(serde_json::Value::take);
    let graph = value.pointer_mut("/report/graph").map(serde_json::Value::take);
    let graph = graph.unwrap_or(value);
    let result: ScanResult = serde_json::from_value(graph)
        .map_err(|e| format!("Not a scan graph {}: {}", path.display(), e))?;

    let Some(saved) = saved else {
        let summary = ScanSummary::for_result(&result, "unknown");
        return Ok((result, summary));
    };
    let region = saved
        .get("region")
        .and_then(|r| r.as_str())
        .unwrap_or("unknown");
    let mut summary = ScanSummary::for_result(&result, region);
    if let Some(id) = saved.get("scan_id").and_then(|id| id.as_str()) {
        summary.scan_id = id.to_string();
    }
    if let Some(at) = saved
        .get("scanned_at")
        .and_then(|at| serde_json::from_value(at.clone()).ok())
    {
        summary.generated_at = at;
    }
    if let Some(failures) = saved
        .get("failures")
        .and_then(|f| serde_json::from_value(f.clone()).ok())
    {
        summary.failures = failures;
    }
    Ok((result, summary))
}

/// Render `result` in the requested format.
pub fn render_output(
    result: &ScanResult,
    summary: &ScanSummary,
    format: ReportFormat,
    width: f64,
    layout: &LayoutConfig,
) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(result, summary)),
        ReportFormat::Json => generate_json_report(result, summary)
            .map_err(|e| format!("Failed to encode JSON report: {}", e)),
        ReportFormat::Svg => Ok(generate_svg_report(result, width, layout)),
        ReportFormat::Html => Ok(generate_html_report(result, summary, width, layout)),
    }
}

pub fn viewer_title(summary: &ScanSummary) -> String {
    format!(
        "cloudscope · {} · {} resources",
        summary.region,
        summary.total()
    )
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}

fn emit(content: &str, output: Option<&PathBuf>, quiet: bool) {
    match output {
        Some(path) => {
            if let Err(e) = save_report(content, path) {
                fail(format!("Failed to write {}: {}", path.display(), e));
            }
            if !quiet {
                println!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", content),
    }
}

pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config(matches: &ArgMatches) -> AppConfig {
    let path = matches.get_one::<PathBuf>("config");
    match AppConfig::load(path.map(|p| p.as_path())) {
        Ok(config) => config,
        Err(e) => fail(e),
    }
}

pub async fn handle_scan(sub_matches: &ArgMatches, config: &AppConfig, quiet: bool) {
    let source = match resolve_source(
        sub_matches.get_one::<PathBuf>("source"),
        sub_matches.get_one::<String>("gateway"),
        sub_matches.get_one::<String>("remote"),
        &config.scan,
    ) {
        Ok(source) => source,
        Err(e) => fail(e),
    };
    let credentials = resolve_credentials(
        sub_matches.get_one::<String>("access-key"),
        sub_matches.get_one::<String>("secret-key"),
        sub_matches.get_one::<String>("region"),
        &config.scan,
    );
    let timeout_secs = sub_matches
        .get_one::<u64>("timeout")
        .copied()
        .unwrap_or(config.scan.timeout_secs);
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let width = *sub_matches.get_one::<f64>("width").unwrap_or(&800.0);
    let output = sub_matches.get_one::<PathBuf>("output");
    let view = sub_matches.get_flag("view");

    if !quiet {
        println!(
            "\n{} Scanning {} in {}",
            "→".blue(),
            source.describe().bright_white(),
            credentials.region.bright_white()
        );
    }

    let options = ScanOptions {
        source,
        credentials,
        timeout_secs,
        show_progress: !quiet,
    };
    let output_data = match execute_scan(options, tracing::info_span!("scan")).await {
        Ok(output) => output,
        Err(e) => fail(format!("Scan failed: {}", e)),
    };

    if !quiet {
        println!(
            "{} Scan complete: {} resources",
            "✓".green().bold(),
            output_data.summary.total()
        );
        for failure in &output_data.summary.failures {
            println!(
                "{} {} unavailable: {}",
                "⚠".yellow().bold(),
                failure.category.tag(),
                failure.message
            );
        }
        println!();
    }

    // The viewer owns the screen; a report is only printed when it goes to a file.
    if !view || output.is_some() {
        let content = match render_output(
            &output_data.result,
            &output_data.summary,
            format,
            width,
            &config.layout,
        ) {
            Ok(content) => content,
            Err(e) => fail(e),
        };
        emit(&content, output, quiet);
    }

    if view {
        let title = viewer_title(&output_data.summary);
        if let Err(e) =
            cloudscope_tui::run_viewer(output_data.result, config.layout.clone(), title)
        {
            fail(format!("Error running viewer: {}", e));
        }
    }
}

pub fn handle_view(sub_matches: &ArgMatches, config: &AppConfig) {
    let Some(path) = sub_matches.get_one::<PathBuf>("FILE") else {
        fail("A scan file is required");
    };
    let (result, summary) = match load_scan_file(path) {
        Ok(loaded) => loaded,
        Err(e) => fail(e),
    };
    if let Err(e) = cloudscope_tui::run_viewer(result, config.layout.clone(), viewer_title(&summary))
    {
        fail(format!("Error running viewer: {}", e));
    }
}

pub fn handle_render(sub_matches: &ArgMatches, config: &AppConfig, quiet: bool) {
    let Some(path) = sub_matches.get_one::<PathBuf>("FILE") else {
        fail("A scan file is required");
    };
    let (result, summary) = match load_scan_file(path) {
        Ok(loaded) => loaded,
        Err(e) => fail(e),
    };
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Svg);
    let width = *sub_matches.get_one::<f64>("width").unwrap_or(&800.0);

    let content = match render_output(&result, &summary, format, width, &config.layout) {
        Ok(content) => content,
        Err(e) => fail(e),
    };
    emit(&content, sub_matches.get_one::<PathBuf>("output"), quiet);
}
