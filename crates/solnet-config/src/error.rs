use thiserror::Error;

/// Errors raised while reading, merging or validating a project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration source error: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("Failed to load .env file: {0}")]
    Dotenv(#[from] dotenv::Error),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("`networks` is declared more than once")]
    DuplicateNetworksBlock,

    #[error("Network profile `{0}` is declared more than once")]
    DuplicateProfile(String),

    #[error("Key `{0}` is declared more than once")]
    DuplicateKey(&'static str),

    #[error("Unknown network `{name}` (available: {})", .available.join(", "))]
    UnknownNetwork {
        name: String,
        available: Vec<String>,
    },

    #[error("Invalid network id: {0}")]
    InvalidNetworkId(String),

    #[error("Invalid network profile `{name}`: {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("Invalid compiler options: {0}")]
    InvalidCompiler(String),

    #[error("Host `{0}` is a wildcard pattern and cannot be dialed")]
    WildcardHost(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
