//! Error types for Notekeeper

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API error
    #[error("API error: {0}")]
    Api(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Rejections raised by the in-memory store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Name, email and password were all empty
    #[error("Invalid request format")]
    EmptyCredentials,

    /// Session id does not resolve to any issued session
    #[error("Unauthorized")]
    Unauthorized,

    /// Collection length no longer fits a u32 id
    #[error("No ids left for {0}")]
    IdsExhausted(&'static str),
}

/// Result type alias for Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
