//! Error types for softnav.

use std::io;

/// Errors produced by the softnav crates.
///
/// Every pipeline failure the controller sees maps to a full reload; the
/// variant only records why, for logging.
#[derive(Debug, thiserror::Error)]
pub enum SoftnavError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request for {locator} failed with status {status}")]
    Status { locator: String, status: u16 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no content region in {0}")]
    NoContentRegion(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SoftnavError>;
