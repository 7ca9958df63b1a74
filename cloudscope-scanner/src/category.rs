use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of resource categories understood by the scanner.
///
/// Serialized with the short provider tags used on the wire (`EC2`, `S3`,
/// `RDS`, `Lambda`). Tags outside the set only ever come from foreign payloads
/// and land in [`Category::Unrecognized`]; no fetcher or mapper produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "EC2")]
    Compute,
    #[serde(rename = "S3")]
    ObjectStore,
    #[serde(rename = "RDS")]
    ManagedDatabase,
    #[serde(rename = "Lambda")]
    Function,
    #[serde(other)]
    Unrecognized,
}

impl Category {
    /// Scannable categories in output priority order.
    pub const ALL: [Category; 4] = [
        Category::Compute,
        Category::ObjectStore,
        Category::ManagedDatabase,
        Category::Function,
    ];

    /// Short tag drawn inside a node and used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Compute => "EC2",
            Category::ObjectStore => "S3",
            Category::ManagedDatabase => "RDS",
            Category::Function => "Lambda",
            Category::Unrecognized => "?",
        }
    }

    /// Lowercase name used for export file names and gateway paths.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Compute => "ec2",
            Category::ObjectStore => "s3",
            Category::ManagedDatabase => "rds",
            Category::Function => "lambda",
            Category::Unrecognized => "unrecognized",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Compute => "Compute",
            Category::ObjectStore => "Object storage",
            Category::ManagedDatabase => "Managed database",
            Category::Function => "Function",
            Category::Unrecognized => "Unrecognized",
        }
    }

    /// Position in [`Category::ALL`]; unrecognized sorts last.
    pub fn priority(&self) -> usize {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
