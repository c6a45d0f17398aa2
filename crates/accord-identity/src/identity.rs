//! Agent identity: ed25519 key pair plus stable agent id
//!
//! The agent id is derived from the public key (`agent:<16 hex>` of its
//! sha256), so the same identity file always yields the same id. Private
//! key bytes never appear in logs, summaries, or exports.

use accord_core::{digest_bytes, AccordError, AgentId, Event, EventHash, Result};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where an agent's identity comes from at session construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// Load from a JSON identity file (hex-encoded keys)
    File(PathBuf),
    /// Generate a fresh ephemeral key pair
    Generate,
}

/// On-disk identity file format
#[derive(Serialize, Deserialize)]
struct IdentityFile {
    agent_id: String,
    public_key: String,
    private_key: String,
}

/// One agent's durable identity: key pair and stable identifier
pub struct Identity {
    signing_key: SigningKey,
    /// Public half of the key pair
    pub verifying_key: VerifyingKey,
    /// Stable identifier derived from the public key
    pub agent_id: AgentId,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose private key bytes, even in debug output
        f.debug_struct("Identity")
            .field("agent_id", &self.agent_id)
            .finish_non_exhaustive()
    }
}

/// Derive the stable agent id from a public key
pub fn agent_id_for_key(verifying_key: &VerifyingKey) -> AgentId {
    let digest = digest_bytes(verifying_key.as_bytes());
    AgentId::new(format!("agent:{}", &digest[..16]))
}

impl Identity {
    /// Generate a fresh identity with an OS-random key pair
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Build an identity from existing private key bytes
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        let agent_id = agent_id_for_key(&verifying_key);
        Self {
            signing_key,
            verifying_key,
            agent_id,
        }
    }

    /// Load an identity from the given source.
    ///
    /// File loading validates that the stored public key matches the
    /// private key and that the stored agent id matches the public key,
    /// rejecting tampered or mispaired identity files.
    pub fn load(source: &IdentitySource) -> Result<Self> {
        match source {
            IdentitySource::Generate => Ok(Self::generate()),
            IdentitySource::File(path) => Self::load_file(path),
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AccordError::persistence(format!("reading identity {}: {e}", path.display()))
        })?;
        let file: IdentityFile = serde_json::from_str(&text)?;

        let private = decode_key_bytes::<32>(&file.private_key, "private key")?;
        let signing_key = SigningKey::from_bytes(&private);
        let identity = Self::from_signing_key(signing_key);

        let public = decode_key_bytes::<32>(&file.public_key, "public key")?;
        if identity.verifying_key.as_bytes() != &public {
            return Err(AccordError::crypto(format!(
                "identity {}: public key does not match private key",
                path.display()
            )));
        }
        if identity.agent_id.as_str() != file.agent_id {
            return Err(AccordError::crypto(format!(
                "identity {}: agent id does not match public key",
                path.display()
            )));
        }

        tracing::debug!(agent_id = %identity.agent_id, path = %path.display(), "identity loaded");
        Ok(identity)
    }

    /// Write this identity to a JSON file for later loading
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = IdentityFile {
            agent_id: self.agent_id.as_str().to_string(),
            public_key: hex::encode(self.verifying_key.as_bytes()),
            private_key: hex::encode(self.signing_key.to_bytes()),
        };
        let text = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, text).map_err(|e| {
            AccordError::persistence(format!("writing identity {}: {e}", path.display()))
        })
    }

    /// Sign arbitrary bytes with this identity's private key, hex-encoded
    pub fn sign_hex(&self, bytes: &[u8]) -> String {
        hex::encode(self.signing_key.sign(bytes).to_bytes())
    }

    /// Produce a signed event for this agent's chain.
    ///
    /// The signature covers the canonical encoding of every other field;
    /// the caller supplies the already-merged payload and its current
    /// chain head as `previous_hash`.
    pub fn sign_event(
        &self,
        event_type: &str,
        payload: BTreeMap<String, Value>,
        previous_hash: EventHash,
        timestamp: i64,
    ) -> Result<Event> {
        let bytes = Event::signing_bytes(
            &self.agent_id,
            event_type,
            &payload,
            &previous_hash,
            timestamp,
        )?;
        Ok(Event {
            agent_id: self.agent_id.clone(),
            event_type: event_type.to_string(),
            payload,
            previous_hash,
            timestamp,
            signature: self.sign_hex(&bytes),
        })
    }
}

fn decode_key_bytes<const N: usize>(hex_str: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| AccordError::crypto(format!("invalid {what} hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| AccordError::crypto(format!("invalid {what} length, expected {N} bytes")))
}
