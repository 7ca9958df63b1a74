use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied credentials. Forwarded as-is, never stored.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
        }
    }

    /// A scan with incomplete credentials fails as a whole before any fetch.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("access key", &self.access_key),
            ("secret key", &self.secret_key),
            ("region", &self.region),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ScanError::InvalidCredentials(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}
