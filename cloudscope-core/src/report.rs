// Report generation from a finished scan

use crate::config::LayoutConfig;
use crate::model::{ScanResult, ScanSummary};
use crate::renderer::GraphRenderer;
use crate::scene::Scene;
use crate::svg::{render_html, render_svg};
use cloudscope_scanner::Category;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Svg,
    Html,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "svg" => Some(ReportFormat::Svg),
            "html" => Some(ReportFormat::Html),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Svg => "svg",
            ReportFormat::Html => "html",
        }
    }
}

pub fn generate_text_report(result: &ScanResult, summary: &ScanSummary) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                        CLOUDSCOPE INVENTORY REPORT\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Scan ID:      {}\n", summary.scan_id));
    report.push_str(&format!("Region:       {}\n", summary.region));
    report.push_str(&format!("Generated:    {}\n", summary.generated_at.to_rfc3339()));
    report.push_str(&format!("Resources:    {}\n", result.nodes.len()));
    report.push('\n');

    report.push_str(RULE);
    report.push_str("SUMMARY\n");
    report.push_str(RULE);
    report.push('\n');

    for category in Category::ALL {
        let count = summary.counts.get(&category).copied().unwrap_or(0);
        let failed = summary.failures.iter().find(|f| f.category == category);
        match failed {
            Some(f) => report.push_str(&format!(
                "  [{:<6}] {:<18} FAILED: {}\n",
                category.tag(),
                category.label(),
                f.message
            )),
            None => report.push_str(&format!(
                "  [{:<6}] {:<18} {}\n",
                category.tag(),
                category.label(),
                count
            )),
        }
    }
    if let Some(&other) = summary.counts.get(&Category::Unrecognized) {
        report.push_str(&format!("  [{:<6}] {:<18} {}\n", "?", "Unrecognized", other));
    }
    report.push('\n');

    if !result.nodes.is_empty() {
        report.push_str(RULE);
        report.push_str("RESOURCES\n");
        report.push_str(RULE);
        report.push('\n');

        let mut current: Option<Category> = None;
        for resource in &result.nodes {
            if current != Some(resource.category) {
                if current.is_some() {
                    report.push('\n');
                }
                report.push_str(&format!("{}\n", resource.category.label()));
                current = Some(resource.category);
            }
            if resource.display_name == resource.id {
                report.push_str(&format!("  {}\n", resource.id));
            } else {
                report.push_str(&format!("  {}  ({})\n", resource.display_name, resource.id));
            }
            if let Some(ref detail) = resource.detail {
                for (label, value) in detail.fields() {
                    report.push_str(&format!("      {:<8} {}\n", format!("{}:", label), value));
                }
            }
        }
        report.push('\n');
    }

    report.push_str(RULE);
    report.push_str("                          End of Report\n");
    report.push_str(RULE);
    report
}

pub fn generate_json_report(
    result: &ScanResult,
    summary: &ScanSummary,
) -> Result<String, serde_json::Error> {
    let by_category: serde_json::Map<String, serde_json::Value> = summary
        .counts
        .iter()
        .map(|(category, count)| (category.tag().to_string(), serde_json::json!(count)))
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "cloudscope",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "scan_id": summary.scan_id,
                "region": summary.region,
                "scanned_at": summary.generated_at.to_rfc3339(),
                "total_resources": summary.total(),
                "by_category": by_category,
                "failures": summary.failures
            },
            "graph": result
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// Lays `result` out to convergence at `width` and returns the scene.
pub fn layout_scene(result: &ScanResult, width: f64, config: &LayoutConfig) -> Scene {
    let mut renderer = GraphRenderer::new(width, config.clone());
    renderer.set_data(result.clone());
    renderer.settle();
    renderer.scene()
}

pub fn generate_svg_report(result: &ScanResult, width: f64, config: &LayoutConfig) -> String {
    render_svg(&layout_scene(result, width, config), result)
}

pub fn generate_html_report(
    result: &ScanResult,
    summary: &ScanSummary,
    width: f64,
    config: &LayoutConfig,
) -> String {
    let title = format!("Cloud inventory {} ({})", summary.region, summary.scan_id);
    render_html(&layout_scene(result, width, config), result, &title)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
