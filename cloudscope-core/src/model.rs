use chrono::{DateTime, Utc};
use cloudscope_scanner::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uniform representation of one cloud resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "details", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ResourceDetail>,
}

impl Resource {
    pub fn new(id: impl Into<String>, category: Category, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            display_name: display_name.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: ResourceDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Category-specific attributes. Only categories that define extra
/// attributes have a variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceDetail {
    Function(FunctionDetail),
}

impl ResourceDetail {
    /// Label/value rows for display, skipping attributes upstream left out.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ResourceDetail::Function(f) => {
                let mut fields = Vec::new();
                if let Some(ref runtime) = f.runtime {
                    fields.push(("Runtime", runtime.clone()));
                }
                if let Some(memory) = f.memory {
                    fields.push(("Memory", format!("{} MB", memory)));
                }
                if let Some(timeout) = f.timeout {
                    fields.push(("Timeout", format!("{} s", timeout)));
                }
                fields
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Memory allocation in MB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    /// Timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

/// Relation between two resources, by id. Never produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Output of one scan. Replaces any earlier result wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub nodes: Vec<Resource>,
    #[serde(default)]
    pub links: Vec<Relation>,
}

impl ScanResult {
    pub fn new(nodes: Vec<Resource>) -> Self {
        Self {
            nodes,
            links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn count_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.category).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFailure {
    pub category: Category,
    pub message: String,
}

/// Bookkeeping that accompanies a [`ScanResult`] in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: String,
    pub region: String,
    pub generated_at: DateTime<Utc>,
    pub counts: BTreeMap<Category, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failures: Vec<CategoryFailure>,
}

impl ScanSummary {
    pub fn for_result(result: &ScanResult, region: impl Into<String>) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            region: region.into(),
            generated_at: Utc::now(),
            counts: result.count_by_category(),
            failures: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
