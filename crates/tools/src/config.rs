//! Deployment configuration resolution
//!
//! This module turns an environment snapshot plus the declared networks and
//! compilers into a typed, fully validated configuration. Resolution runs in
//! a fixed order:
//!
//! 1. `MNEMONIC` must be present and have a valid BIP-39 word count
//! 2. Every network endpoint template is substituted from the environment
//! 3. Compiler versions are checked and kept in declaration order
//!
//! Any failure aborts the whole resolution; a partially resolved
//! configuration is never returned.
//!
//! # Examples
//!
//! ```rust,no_run
//! use standard_token_tools::{EnvironmentInput, Manifest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env = EnvironmentInput::from_process(None)?;
//! let config = Manifest::default().into_resolver().resolve(&env)?;
//! for network in config.networks() {
//!     println!("{} -> {}", network.name, network.endpoint);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compiler::CompilerSpec;
use crate::env::EnvironmentInput;
use crate::mnemonic::MnemonicPhrase;
use crate::network::{NetworkDescriptor, NetworkTemplate};

/// Name of the variable holding the account seed phrase.
pub const MNEMONIC_VAR: &str = "MNEMONIC";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVariable(String),

    #[error("The mnemonic has {actual} words; it must have one of {allowed:?}")]
    InvalidMnemonicLength {
        actual: usize,
        allowed: [usize; 4],
    },

    #[error("Invalid compiler version: {0:?}. Must be MAJOR.MINOR.PATCH")]
    InvalidCompilerVersion(String),

    #[error("Network {0} is declared more than once")]
    DuplicateNetwork(String),

    #[error("Invalid chain id {chain_id} for network {network}. Must be greater than 0")]
    InvalidChainId { network: String, chain_id: u64 },

    #[error("Invalid endpoint template for network {network}: {template}")]
    InvalidEndpointTemplate { network: String, template: String },

    #[error("Manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Env file error: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// Resolved configuration handed to the deploy tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    networks: BTreeMap<String, NetworkDescriptor>,
    compilers: Vec<CompilerSpec>,
}

impl ResolvedConfig {
    /// Networks, ordered by name
    pub fn networks(&self) -> impl Iterator<Item = &NetworkDescriptor> {
        self.networks.values()
    }

    pub fn network(&self, name: &str) -> Option<&NetworkDescriptor> {
        self.networks.get(name)
    }

    /// Compilers, in declaration order
    pub fn compilers(&self) -> &[CompilerSpec] {
        &self.compilers
    }

    /// Print the resolved configuration. The mnemonic and credential
    /// variables in endpoints are never shown.
    pub fn print_summary(&self) {
        print!("{}", self.summary());
    }

    /// The text printed by [`print_summary`](Self::print_summary).
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("╔════════════════════════════════════════════════════════════════╗\n");
        out.push_str("║         DEPLOYMENT CONFIGURATION RESOLVED                      ║\n");
        out.push_str("╚════════════════════════════════════════════════════════════════╝\n");

        for network in self.networks() {
            let _ = writeln!(out, "  Network:             {}", network.name);
            let _ = writeln!(out, "    Chain ID:          {}", network.chain_id);
            let _ = writeln!(out, "    RPC URL:           {}", network.display_endpoint);
            match network.account_source {
                Some(ref mnemonic) => {
                    let _ = writeln!(out, "    Accounts:          mnemonic {}", mnemonic);
                }
                None => out.push_str("    Accounts:          (not configured)\n"),
            }
        }

        let versions: Vec<&str> = self.compilers.iter().map(|c| c.version.as_str()).collect();
        if versions.is_empty() {
            out.push_str("  Compilers:           (none)\n");
        } else {
            let _ = writeln!(out, "  Compilers:           {}", versions.join(", "));
        }

        out.push_str("╚════════════════════════════════════════════════════════════════╝\n");
        out
    }

    /// Render the configuration in the layout the deploy tool reads.
    ///
    /// This output contains the mnemonic in clear text.
    pub fn to_tool_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&ToolConfig(self))
    }
}

/// `{"networks": {...}, "solidity": {"compilers": [...]}}`
struct ToolConfig<'a>(&'a ResolvedConfig);

struct ToolNetworks<'a>(&'a BTreeMap<String, NetworkDescriptor>);

struct ToolNetwork<'a>(&'a NetworkDescriptor);

#[derive(Serialize)]
struct ToolAccounts<'a> {
    mnemonic: &'a str,
}

#[derive(Serialize)]
struct ToolSolidity<'a> {
    compilers: &'a [CompilerSpec],
}

impl Serialize for ToolConfig<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("networks", &ToolNetworks(&self.0.networks))?;
        map.serialize_entry(
            "solidity",
            &ToolSolidity {
                compilers: &self.0.compilers,
            },
        )?;
        map.end()
    }
}

impl Serialize for ToolNetworks<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, network) in self.0 {
            map.serialize_entry(name, &ToolNetwork(network))?;
        }
        map.end()
    }
}

impl Serialize for ToolNetwork<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let network = self.0;
        let mut state = serializer.serialize_struct("Network", 3)?;
        state.serialize_field("chainId", &network.chain_id)?;
        state.serialize_field("url", &network.endpoint)?;
        match network.account_source {
            Some(ref mnemonic) => state.serialize_field(
                "accounts",
                &ToolAccounts {
                    mnemonic: mnemonic.expose(),
                },
            )?,
            None => state.skip_field("accounts")?,
        }
        state.end()
    }
}

/// Validates declared networks and compilers against an environment snapshot.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    networks: Vec<NetworkTemplate>,
    compilers: Vec<CompilerSpec>,
}

impl ConfigResolver {
    pub fn new(networks: Vec<NetworkTemplate>, compilers: Vec<CompilerSpec>) -> Self {
        Self {
            networks,
            compilers,
        }
    }

    pub fn networks(&self) -> &[NetworkTemplate] {
        &self.networks
    }

    pub fn compilers(&self) -> &[CompilerSpec] {
        &self.compilers
    }

    /// Resolve the declared configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `MNEMONIC` is missing or has an invalid word count (checked first)
    /// - a network name repeats, has chain id 0, or its endpoint needs a
    ///   missing variable
    /// - a compiler version is not a semantic version
    pub fn resolve(&self, env: &EnvironmentInput) -> Result<ResolvedConfig, ConfigError> {
        let mnemonic = MnemonicPhrase::parse(env.require(MNEMONIC_VAR)?)?;
        debug!(words = mnemonic.word_count(), "mnemonic accepted");

        let mut networks = BTreeMap::new();
        for template in &self.networks {
            if networks.contains_key(&template.name) {
                return Err(ConfigError::DuplicateNetwork(template.name.clone()));
            }
            let descriptor = template.resolve(env, &mnemonic)?;
            debug!(
                network = %descriptor.name,
                chain_id = descriptor.chain_id,
                accounts = descriptor.account_source.is_some(),
                "network resolved"
            );
            networks.insert(descriptor.name.clone(), descriptor);
        }

        for (index, compiler) in self.compilers.iter().enumerate() {
            compiler.validate()?;
            if self.compilers[..index].contains(compiler) {
                warn!(version = %compiler.version, "compiler version declared more than once");
            }
        }

        info!(
            networks = networks.len(),
            compilers = self.compilers.len(),
            "configuration resolved"
        );

        Ok(ResolvedConfig {
            networks,
            compilers: self.compilers.clone(),
        })
    }
}

/// Resolve `declared_networks` and `declared_compilers` against `env`.
pub fn resolve(
    env: &EnvironmentInput,
    declared_networks: &[NetworkTemplate],
    declared_compilers: &[CompilerSpec],
) -> Result<ResolvedConfig, ConfigError> {
    ConfigResolver::new(declared_networks.to_vec(), declared_compilers.to_vec()).resolve(env)
}
