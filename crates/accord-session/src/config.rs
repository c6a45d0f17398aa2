//! Session configuration
//!
//! The construction input is an ordered list of agent specs; order matters
//! because it fixes the deterministic handshake pairing. Configs can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! [[agents]]
//! name = "advisor"
//! identity = { file = "advisor.json" }
//!
//! [[agents]]
//! name = "trading_bot"
//! identity = "generate"
//! ```

use accord_core::{AccordError, Result};
use accord_identity::IdentitySource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One agent's construction input: name plus identity source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Session-scoped human-readable name, unique within the registry
    pub name: String,
    /// Where the agent's key material comes from
    pub identity: IdentitySource,
}

impl AgentSpec {
    /// Spec for an agent loading its identity from a file
    pub fn from_file(name: impl Into<String>, path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            name: name.into(),
            identity: IdentitySource::File(path.into()),
        }
    }

    /// Spec for an agent with a freshly generated identity
    pub fn generated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity: IdentitySource::Generate,
        }
    }
}

/// Ordered session construction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Agents in registration order; minimum length 2
    pub agents: Vec<AgentSpec>,
}

impl SessionConfig {
    /// Build a config from an ordered list of agent specs
    pub fn new(agents: Vec<AgentSpec>) -> Self {
        Self { agents }
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| AccordError::configuration(format!("invalid session config: {e}")))
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AccordError::persistence(format!("reading config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }
}
