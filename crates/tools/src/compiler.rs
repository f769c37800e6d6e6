//! Compiler version declarations.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One entry of the ordered compiler list. The deploy tool takes the first
/// entry matching a source file's pragma, so order is preserved as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerSpec {
    pub version: String,
}

impl CompilerSpec {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Check that the version is a full `MAJOR.MINOR.PATCH` semantic version.
    pub fn validate(&self) -> Result<semver::Version, ConfigError> {
        semver::Version::parse(&self.version)
            .map_err(|_| ConfigError::InvalidCompilerVersion(self.version.clone()))
    }
}
