//! Environment snapshot used as the single input of configuration resolution.
//!
//! The snapshot is taken once: `.env` entries first, then the process
//! environment on top, so an exported variable always wins over the file.
//! Nothing here mutates the process environment.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ConfigError;

/// Immutable mapping from variable name to raw value.
///
/// Blank values (empty or whitespace only) are treated as absent by every
/// lookup, so a `KEY=` line in `.env` never satisfies a required variable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvironmentInput {
    vars: BTreeMap<String, String>,
}

impl EnvironmentInput {
    /// Snapshot the process environment, layered over an optional `.env` file.
    ///
    /// With `env_file = None` the usual `.env` lookup of `dotenvy` is used and
    /// a missing file is not an error. An explicitly named file must exist.
    pub fn from_process(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut vars = BTreeMap::new();

        let entries = match env_file {
            Some(path) => Some(dotenvy::from_path_iter(path)?),
            None => match dotenvy::dotenv_iter() {
                Ok(iter) => Some(iter),
                Err(e) if e.not_found() => {
                    debug!("no .env file found, using process environment only");
                    None
                }
                Err(e) => return Err(e.into()),
            },
        };

        if let Some(entries) = entries {
            for entry in entries {
                let (key, value) = entry?;
                vars.insert(key, value);
            }
        }

        for (key, value) in std::env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    vars.insert(key, value);
                }
                (Ok(key), Err(_)) => warn!(%key, "ignoring non-UTF-8 environment value"),
                _ => {}
            }
        }

        Ok(Self { vars })
    }

    /// Look up a variable, treating blank values as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Look up a variable that must be present.
    pub fn require(&self, name: &str) -> Result<&str, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::MissingVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvironmentInput
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Values may hold secrets (MNEMONIC, API keys); only names are printed.
impl fmt::Debug for EnvironmentInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentInput")
            .field("vars", &self.vars.keys().collect::<Vec<_>>())
            .finish()
    }
}
