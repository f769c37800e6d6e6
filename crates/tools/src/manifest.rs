//! Declared networks and compilers (`deploy.toml`)
//!
//! The manifest is located in priority order:
//!
//! 1. Explicit path (`--manifest`)
//! 2. `DEPLOY_MANIFEST` environment variable
//! 3. `deploy.toml` in the working directory
//! 4. Built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compiler::CompilerSpec;
use crate::config::{ConfigError, ConfigResolver};
use crate::env::EnvironmentInput;
use crate::network::NetworkTemplate;

pub const MANIFEST_ENV_VAR: &str = "DEPLOY_MANIFEST";
pub const MANIFEST_FILE_NAME: &str = "deploy.toml";

/// Where the manifest was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Explicit(PathBuf),
    Environment(PathBuf),
    WorkingDir(PathBuf),
    BuiltIn,
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSource::Explicit(path) => write!(f, "{}", path.display()),
            ManifestSource::Environment(path) => {
                write!(f, "{} (from {})", path.display(), MANIFEST_ENV_VAR)
            }
            ManifestSource::WorkingDir(path) => write!(f, "{}", path.display()),
            ManifestSource::BuiltIn => write!(f, "built-in defaults"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub networks: Vec<NetworkTemplate>,
    #[serde(default)]
    pub compilers: Vec<CompilerSpec>,
}

impl Default for Manifest {
    /// The Optimism testnet/mainnet pair and the two solc versions the
    /// token contracts build with.
    fn default() -> Self {
        Self {
            networks: vec![
                NetworkTemplate::new(
                    "optimism-testnet",
                    57000,
                    "{L2_TESTNET_API_URL}/{L2_API_KEY}",
                ),
                NetworkTemplate::new("optimism-mainnet", 10, "{L2_MAINNET_API_URL}/{L2_API_KEY}"),
            ],
            compilers: vec![CompilerSpec::new("0.8.13"), CompilerSpec::new("0.8.0")],
        }
    }
}

impl Manifest {
    /// Locate and load the manifest.
    ///
    /// Relative paths from the environment and the implicit `deploy.toml`
    /// are resolved against `dir`.
    ///
    /// # Errors
    ///
    /// An explicitly requested manifest (flag or environment) must exist.
    pub fn load(
        explicit: Option<&Path>,
        env: &EnvironmentInput,
        dir: &Path,
    ) -> Result<(Self, ManifestSource), ConfigError> {
        let source = Self::locate(explicit, env, dir);

        let manifest = match &source {
            ManifestSource::Explicit(path) | ManifestSource::Environment(path) => {
                if !path.exists() {
                    return Err(ConfigError::ManifestNotFound(path.clone()));
                }
                Self::from_file(path)?
            }
            ManifestSource::WorkingDir(path) => Self::from_file(path)?,
            ManifestSource::BuiltIn => {
                debug!("no manifest file, using built-in defaults");
                Self::default()
            }
        };

        info!(
            source = %source,
            networks = manifest.networks.len(),
            compilers = manifest.compilers.len(),
            "manifest loaded"
        );
        Ok((manifest, source))
    }

    fn locate(explicit: Option<&Path>, env: &EnvironmentInput, dir: &Path) -> ManifestSource {
        if let Some(path) = explicit {
            return ManifestSource::Explicit(path.to_path_buf());
        }
        if let Some(path) = env.get(MANIFEST_ENV_VAR) {
            return ManifestSource::Environment(dir.join(path));
        }
        let implicit = dir.join(MANIFEST_FILE_NAME);
        if implicit.exists() {
            ManifestSource::WorkingDir(implicit)
        } else {
            ManifestSource::BuiltIn
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Toml)
    }

    pub fn into_resolver(self) -> ConfigResolver {
        ConfigResolver::new(self.networks, self.compilers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MANIFEST: &str = r#"
[[networks]]
name = "local"
chain_id = 31337
endpoint = "http://127.0.0.1:8545"
accounts = false

[[networks]]
name = "optimism-testnet"
chain_id = 57000
endpoint = "{L2_TESTNET_API_URL}/{L2_API_KEY}"

[[compilers]]
version = "0.8.13"
"#;

    #[test]
    fn test_default_manifest() {
        let manifest = Manifest::default();
        let names: Vec<&str> = manifest.networks.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["optimism-testnet", "optimism-mainnet"]);
        assert_eq!(manifest.networks[0].chain_id, 57000);
        assert_eq!(manifest.networks[1].chain_id, 10);
        assert!(manifest.networks.iter().all(|n| n.accounts));
        assert_eq!(
            manifest.compilers,
            vec![CompilerSpec::new("0.8.13"), CompilerSpec::new("0.8.0")]
        );
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_toml(MANIFEST).unwrap();
        assert_eq!(manifest.networks.len(), 2);
        assert!(!manifest.networks[0].accounts);
        assert!(manifest.networks[1].accounts);
        assert_eq!(manifest.compilers, vec![CompilerSpec::new("0.8.13")]);
    }

    #[test]
    fn test_parse_empty_manifest() {
        let manifest = Manifest::from_toml("").unwrap();
        assert!(manifest.networks.is_empty());
        assert!(manifest.compilers.is_empty());
    }

    #[test]
    fn test_parse_invalid_manifest() {
        let result = Manifest::from_toml("[[networks]]\nname = 5\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_misspelled_section_rejected() {
        let result = Manifest::from_toml(
            r#"
[[network]]
name = "optimism-testnet"
chain_id = 57000
endpoint = "{L2_TESTNET_API_URL}/{L2_API_KEY}"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_misspelled_network_key_rejected() {
        let result = Manifest::from_toml(
            r#"
[[networks]]
name = "local"
chain_id = 31337
endpoint = "http://127.0.0.1:8545"
acounts = false
"#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_misspelled_compiler_key_rejected() {
        let result = Manifest::from_toml("[[compilers]]\nversion = \"0.8.13\"\noptimizer = true\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (manifest, source) =
            Manifest::load(None, &EnvironmentInput::default(), dir.path()).unwrap();
        assert_eq!(source, ManifestSource::BuiltIn);
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_load_working_dir_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE_NAME), MANIFEST).unwrap();

        let (manifest, source) =
            Manifest::load(None, &EnvironmentInput::default(), dir.path()).unwrap();
        assert!(matches!(source, ManifestSource::WorkingDir(_)));
        assert_eq!(manifest.networks[0].name, "local");
    }

    #[test]
    fn test_env_var_beats_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE_NAME), MANIFEST).unwrap();
        fs::write(dir.path().join("other.toml"), "[[compilers]]\nversion = \"0.7.6\"\n").unwrap();

        let env: EnvironmentInput = [(MANIFEST_ENV_VAR, "other.toml")].into_iter().collect();
        let (manifest, source) = Manifest::load(None, &env, dir.path()).unwrap();
        assert_eq!(source, ManifestSource::Environment(dir.path().join("other.toml")));
        assert_eq!(manifest.compilers, vec![CompilerSpec::new("0.7.6")]);
    }

    #[test]
    fn test_explicit_beats_env_var() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, MANIFEST).unwrap();

        let env: EnvironmentInput = [(MANIFEST_ENV_VAR, "missing.toml")].into_iter().collect();
        let (_, source) = Manifest::load(Some(&explicit), &env, dir.path()).unwrap();
        assert_eq!(source, ManifestSource::Explicit(explicit));
    }

    #[test]
    fn test_missing_env_var_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE_NAME), MANIFEST).unwrap();

        let env: EnvironmentInput = [(MANIFEST_ENV_VAR, "gone.toml")].into_iter().collect();
        let result = Manifest::load(None, &env, dir.path());
        let expected = dir.path().join("gone.toml");
        assert!(matches!(result, Err(ConfigError::ManifestNotFound(p)) if p == expected));
    }

    #[test]
    fn test_missing_explicit_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = Manifest::load(Some(&missing), &EnvironmentInput::default(), dir.path());
        assert!(matches!(result, Err(ConfigError::ManifestNotFound(p)) if p == missing));
    }
}
