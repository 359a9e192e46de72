use std::path::PathBuf;
use thiserror::Error;

/// Errors detected before a run touches the network
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No repository configured; set `repository = \"owner/name\"` or GITHUB_REPOSITORY")]
    MissingRepository,

    #[error("Invalid repository '{0}', expected 'owner/name'")]
    InvalidRepository(String),

    #[error("days threshold must not be negative (got {0})")]
    NegativeThreshold(i64),

    #[error("Invalid days threshold '{0}'")]
    InvalidThreshold(String),

    #[error("Invalid value '{value}' for {key}, expected a number")]
    InvalidNumber { key: String, value: String },

    #[error("Invalid value '{value}' for {key}, expected true or false")]
    InvalidBool { key: String, value: String },

    #[error("Invalid {kind} '{token}': must be 1-50 characters without control characters")]
    InvalidToken { kind: &'static str, token: String },

    #[error("At least one parent issue label or type is required unless updating all ancestors")]
    NoParentFilters,

    #[error("Update message must not be empty")]
    EmptyMessage,

    #[error("Write concurrency must be between 1 and {max} (got {got})")]
    InvalidConcurrency { got: i64, max: usize },
}
