// Folding of per-category fetch outcomes into uniform resource records

use crate::model::{
    CategoryFailure, FunctionDetail, Resource, ResourceDetail, ScanResult, ScanSummary,
};
use cloudscope_scanner::{Category, FetchOutcome, Inventory};
use serde_json::Value;
use tracing::{Span, debug, info, warn};

/// Maps one provider-native record to a resource, or `None` when the record
/// has no usable primary key.
pub type Mapper = fn(&Value) -> Option<Resource>;

/// Dispatch table: the mapping function for a category.
pub fn mapper_for(category: Category) -> Option<Mapper> {
    match category {
        Category::Compute => Some(map_compute as Mapper),
        Category::ObjectStore => Some(map_object_store as Mapper),
        Category::ManagedDatabase => Some(map_managed_database as Mapper),
        Category::Function => Some(map_function as Mapper),
        Category::Unrecognized => None,
    }
}

/// Non-empty string at `key`. Anything else counts as absent.
fn str_field(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn u32_field(record: &Value, key: &str) -> Option<u32> {
    record
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

pub fn map_compute(record: &Value) -> Option<Resource> {
    let id = str_field(record, "InstanceId")?;
    let name = record
        .get("Tags")
        .and_then(Value::as_array)
        .and_then(|tags| {
            tags.iter()
                .find(|tag| tag.get("Key").and_then(Value::as_str) == Some("Name"))
        })
        .and_then(|tag| str_field(tag, "Value"))
        .unwrap_or_else(|| id.clone());
    Some(Resource::new(id, Category::Compute, name))
}

pub fn map_object_store(record: &Value) -> Option<Resource> {
    let id = str_field(record, "Name")?;
    Some(Resource::new(id.clone(), Category::ObjectStore, id))
}

pub fn map_managed_database(record: &Value) -> Option<Resource> {
    let id = str_field(record, "DBInstanceIdentifier")?;
    Some(Resource::new(id.clone(), Category::ManagedDatabase, id))
}

pub fn map_function(record: &Value) -> Option<Resource> {
    let id = str_field(record, "FunctionArn")?;
    let name = str_field(record, "FunctionName").unwrap_or_else(|| id.clone());
    let detail = ResourceDetail::Function(FunctionDetail {
        runtime: str_field(record, "Runtime"),
        memory: u32_field(record, "MemorySize"),
        timeout: u32_field(record, "Timeout"),
    });
    Some(Resource::new(id, Category::Function, name).with_detail(detail))
}

/// Turns an [`Inventory`] into an ordered resource sequence.
///
/// Categories are emitted in [`Category::ALL`] order and records keep their
/// upstream order within a category. A failed category contributes nothing
/// and never affects the others. Ids are not deduplicated across categories.
pub struct Normalizer {
    span: Span,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self { span: Span::none() }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn normalize(&self, inventory: &Inventory) -> Vec<Resource> {
        let mut resources = Vec::new();

        for (category, outcome) in inventory.iter() {
            let records = match outcome {
                FetchOutcome::Records(records) => records,
                FetchOutcome::Failed(message) => {
                    warn!(parent: &self.span, %category, %message, "Skipping failed category");
                    continue;
                }
            };

            let Some(mapper) = mapper_for(category) else {
                warn!(parent: &self.span, %category, "No mapper for category");
                continue;
            };

            let before = resources.len();
            for (position, record) in records.iter().enumerate() {
                match mapper(record) {
                    Some(resource) => resources.push(resource),
                    None => {
                        debug!(parent: &self.span, %category, position, "Skipping record without primary key")
                    }
                }
            }
            debug!(
                parent: &self.span,
                %category,
                emitted = resources.len() - before,
                skipped = records.len() - (resources.len() - before),
                "Normalized category"
            );
        }

        info!(parent: &self.span, nodes = resources.len(), "Normalization complete");
        resources
    }

    /// Normalizes and records per-category counts and failures for reports.
    pub fn normalize_with_summary(
        &self,
        inventory: &Inventory,
        region: &str,
    ) -> (ScanResult, ScanSummary) {
        let result = ScanResult::new(self.normalize(inventory));
        let mut summary = ScanSummary::for_result(&result, region);
        summary.failures = inventory
            .failures()
            .map(|(category, message)| CategoryFailure {
                category,
                message: message.to_string(),
            })
            .collect();
        (result, summary)
    }
}
