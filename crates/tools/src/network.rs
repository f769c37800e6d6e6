//! Declared network templates and their resolved form.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::env::EnvironmentInput;
use crate::mnemonic::MnemonicPhrase;

/// Variable name suffixes whose values are masked in display output.
const SECRET_SUFFIXES: [&str; 4] = ["_KEY", "_SECRET", "_TOKEN", "_PASSWORD"];

/// Placeholder shown instead of a secret value.
pub const MASK: &str = "****";

fn default_accounts() -> bool {
    true
}

/// Whether a variable holds a credential that must not be displayed.
pub fn is_secret_variable(name: &str) -> bool {
    SECRET_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// A network as declared in the manifest, before any substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkTemplate {
    pub name: String,
    pub chain_id: u64,
    /// Endpoint URL with `{VARIABLE}` placeholders
    pub endpoint: String,
    /// Whether accounts are derived from the mnemonic for this network
    #[serde(default = "default_accounts")]
    pub accounts: bool,
}

impl NetworkTemplate {
    pub fn new(name: impl Into<String>, chain_id: u64, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain_id,
            endpoint: endpoint.into(),
            accounts: true,
        }
    }

    /// Mark the network as not needing account derivation.
    pub fn without_accounts(mut self) -> Self {
        self.accounts = false;
        self
    }

    /// Variable names referenced by the endpoint template, in order.
    pub fn placeholders(&self) -> Result<Vec<&str>, ConfigError> {
        let mut names = Vec::new();
        for segment in self.segments()? {
            if let Segment::Variable(name) = segment {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Substitute every placeholder from the environment.
    ///
    /// Fails on the first absent variable; an empty value is never
    /// substituted.
    pub fn render_endpoint(&self, env: &EnvironmentInput) -> Result<String, ConfigError> {
        self.render(env, false)
    }

    /// Like [`render_endpoint`](Self::render_endpoint), with credential
    /// variables (`*_KEY`, `*_SECRET`, `*_TOKEN`, `*_PASSWORD`) masked.
    pub fn render_display_endpoint(&self, env: &EnvironmentInput) -> Result<String, ConfigError> {
        self.render(env, true)
    }

    fn render(&self, env: &EnvironmentInput, mask_secrets: bool) -> Result<String, ConfigError> {
        let mut url = String::with_capacity(self.endpoint.len());
        for segment in self.segments()? {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Variable(name) => {
                    let value = env.require(name)?;
                    if mask_secrets && is_secret_variable(name) {
                        url.push_str(MASK);
                    } else {
                        url.push_str(value);
                    }
                }
            }
        }
        Ok(url)
    }

    pub(crate) fn resolve(
        &self,
        env: &EnvironmentInput,
        mnemonic: &MnemonicPhrase,
    ) -> Result<NetworkDescriptor, ConfigError> {
        if self.chain_id == 0 {
            return Err(ConfigError::InvalidChainId {
                network: self.name.clone(),
                chain_id: self.chain_id,
            });
        }

        Ok(NetworkDescriptor {
            name: self.name.clone(),
            chain_id: self.chain_id,
            endpoint: self.render_endpoint(env)?,
            display_endpoint: self.render_display_endpoint(env)?,
            account_source: self.accounts.then(|| mnemonic.clone()),
        })
    }

    fn segments(&self) -> Result<Vec<Segment<'_>>, ConfigError> {
        let invalid = || ConfigError::InvalidEndpointTemplate {
            network: self.name.clone(),
            template: self.endpoint.clone(),
        };

        let mut segments = Vec::new();
        let mut rest = self.endpoint.as_str();

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(&rest[..open]));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(invalid)?;
            let name = &after[..close];
            let valid_name = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if name.is_empty() || !valid_name {
                return Err(invalid());
            }
            segments.push(Segment::Variable(name));
            rest = &after[close + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        Ok(segments)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Variable(&'a str),
}

/// A network with its endpoint fully substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub name: String,
    pub chain_id: u64,
    pub endpoint: String,
    /// Endpoint with credential variables masked, safe to print
    pub display_endpoint: String,
    /// Set for every network that derives accounts
    pub account_source: Option<MnemonicPhrase>,
}
