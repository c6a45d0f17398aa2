//! Unified error system for Accord
//!
//! One error enum covers every failure the protocol can surface. All errors
//! are fatal to the call that triggered them; nothing in the protocol
//! retries internally.

use serde::{Deserialize, Serialize};

/// Unified error type for all Accord operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AccordError {
    /// Invalid session construction input
    #[error("Configuration error: {message}")]
    Configuration {
        /// What made the configuration invalid
        message: String,
    },

    /// Operation called in the wrong session state
    #[error("State error: {message}")]
    State {
        /// Which transition was rejected and why
        message: String,
    },

    /// Unknown agent or peer name
    #[error("Lookup error: {message}")]
    Lookup {
        /// The name that failed to resolve
        message: String,
    },

    /// Signing or verification failure
    #[error("Crypto error: {message}")]
    Crypto {
        /// Description of the cryptographic failure
        message: String,
    },

    /// Event store write or read failure
    #[error("Persistence error: {message}")]
    Persistence {
        /// Description of the storage failure
        message: String,
    },

    /// Serialization/deserialization failure
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the encoding failure
        message: String,
    },
}

impl AccordError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create a lookup error
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AccordError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Result type for all Accord operations
pub type Result<T> = std::result::Result<T, AccordError>;
