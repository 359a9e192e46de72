//! Configuration for heirloom
//!
//! This crate provides:
//! - Configuration file discovery and loading (TOML)
//! - The GitHub Action input overlay (`INPUT_*` environment variables)
//! - Validation into an immutable [`Config`] value that is passed explicitly
//!   to every part of a run

pub mod config;
pub mod config_file;
pub mod env;
pub mod error;
pub mod settings;

pub use config::{
    parse_token_list, Config, ParentFilters, Repository, SelectionMode, DEFAULT_DAYS_THRESHOLD,
    DEFAULT_UPDATE_MESSAGE, MAX_WRITE_CONCURRENCY,
};
pub use config_file::load_config_file;
pub use env::settings_from_env;
pub use error::ConfigError;
pub use settings::{Settings, TokenList};
