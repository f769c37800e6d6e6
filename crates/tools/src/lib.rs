//! Standard Token Tools Library
//!
//! Validates and resolves the environment-driven deployment configuration
//! (networks, account mnemonic, compiler versions) before it is handed to
//! the contract build/deploy toolchain.

pub mod compiler;
pub mod config;
pub mod env;
pub mod logging;
pub mod manifest;
pub mod mnemonic;
pub mod network;

pub use compiler::CompilerSpec;
pub use config::{resolve, ConfigError, ConfigResolver, ResolvedConfig, MNEMONIC_VAR};
pub use env::EnvironmentInput;
pub use manifest::{Manifest, ManifestSource};
pub use mnemonic::{MnemonicPhrase, VALID_WORD_COUNTS};
pub use network::{NetworkDescriptor, NetworkTemplate};
