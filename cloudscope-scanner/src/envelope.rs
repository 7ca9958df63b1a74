// Unwrapping of provider list-API response envelopes into flat record lists

use crate::category::Category;
use crate::error::{Result, ScanError};
use serde_json::Value;

/// Pulls the record list out of a list-API response body.
///
/// A bare JSON array is taken as an already-flattened record list. A missing
/// envelope key yields no records; a body that is neither an object nor an
/// array is an error.
pub fn extract_records(category: Category, body: Value) -> Result<Vec<Value>> {
    let mut object = match body {
        Value::Array(records) => return Ok(records),
        Value::Object(map) => map,
        other => {
            return Err(ScanError::UnexpectedShape(format!(
                "{} response is not an object: {}",
                category.tag(),
                type_name(&other)
            )));
        }
    };

    let key = match category {
        Category::Compute => "Reservations",
        Category::ObjectStore => "Buckets",
        Category::ManagedDatabase => "DBInstances",
        Category::Function => "Functions",
        Category::Unrecognized => {
            return Err(ScanError::UnexpectedShape(
                "no envelope for unrecognized category".to_string(),
            ));
        }
    };

    let list = match object.remove(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(list)) => list,
        Some(other) => {
            return Err(ScanError::UnexpectedShape(format!(
                "{}.{} is {}, expected array",
                category.tag(),
                key,
                type_name(&other)
            )));
        }
    };

    if category == Category::Compute {
        // Instances are nested one level deeper, inside reservations.
        Ok(list
            .into_iter()
            .flat_map(|mut reservation| match reservation.get_mut("Instances").map(Value::take) {
                Some(Value::Array(instances)) => instances,
                _ => Vec::new(),
            })
            .collect())
    } else {
        Ok(list)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
