//! Error types shared across the Vellum client core.

use thiserror::Error;

/// Common result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error taxonomy
///
/// Transient sync errors are relayed as events rather than surfaced here;
/// authentication failures are structured results (`AuthError`), not
/// `Err` values. This enum covers the remaining failure channels.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Local persisted store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Sync engine failure outside the relayed-event channel
    #[error("Sync error: {0}")]
    Sync(String),

    /// Identity/key engine failure
    #[error("Auth error: {0}")]
    Auth(String),

    /// Key derivation or item decryption failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Imported payload could not be parsed as structured data
    #[error("Invalid import file: {0}")]
    InvalidImportFile(#[from] serde_json::Error),

    /// Whole-batch key derivation failure during import
    #[error("Unable to derive keys for import: {0}")]
    ImportKeyDerivation(String),

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Model store failure
    #[error("Model error: {0}")]
    Model(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a store failure with a formatted message.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Shorthand for a sync failure with a formatted message.
    pub fn sync(msg: impl Into<String>) -> Self {
        Self::Sync(msg.into())
    }

    /// Shorthand for an auth failure with a formatted message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Shorthand for a crypto failure with a formatted message.
    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::Crypto(msg.into())
    }
}
