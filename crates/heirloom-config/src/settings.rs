//! Unvalidated configuration layer
//!
//! Each source (config file, environment, command line) produces a
//! [`Settings`] value with only the options it sets. Layers are merged with
//! [`Settings::overlay`] and turned into a [`Config`](crate::Config) by
//! [`Settings::resolve`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Settings as written in `.heirloom.toml`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Repository in `owner/name` form
    pub repository: Option<String>,

    /// GitHub host for GitHub Enterprise (default github.com)
    pub host: Option<String>,

    /// Labels marking parent issues
    pub parent_issue_labels: Option<TokenList>,

    /// Issue types marking parent issues
    pub parent_issue_types: Option<TokenList>,

    /// Protect every ancestor of a recently active issue, ignoring filters
    pub update_all_ancestors: Option<bool>,

    pub days_threshold: Option<i64>,

    /// Comment posted on refreshed parents
    pub update_message: Option<String>,

    /// Comments posted in parallel (1-5)
    pub write_concurrency: Option<i64>,

    /// Plan only, never post
    pub dry_run: Option<bool>,
}

/// A list of labels or types, either comma-separated or a TOML array
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TokenList {
    Csv(String),
    List(Vec<String>),
}

impl TokenList {
    /// Trimmed, non-empty tokens in input order
    pub fn tokens(&self) -> Vec<String> {
        match self {
            TokenList::Csv(s) => crate::parse_token_list(s),
            TokenList::List(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML content
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from the config file, or empty settings if there is none
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match crate::load_config_file(explicit)? {
            Some((path, content)) => {
                let settings = Self::from_toml(&content, &path)?;
                log::info!("Loaded config from {}", path.display());
                Ok(settings)
            }
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Layer `other` on top of `self`; options set in `other` win
    pub fn overlay(self, other: Settings) -> Settings {
        Settings {
            repository: other.repository.or(self.repository),
            host: other.host.or(self.host),
            parent_issue_labels: other.parent_issue_labels.or(self.parent_issue_labels),
            parent_issue_types: other.parent_issue_types.or(self.parent_issue_types),
            update_all_ancestors: other.update_all_ancestors.or(self.update_all_ancestors),
            days_threshold: other.days_threshold.or(self.days_threshold),
            update_message: other.update_message.or(self.update_message),
            write_concurrency: other.write_concurrency.or(self.write_concurrency),
            dry_run: other.dry_run.or(self.dry_run),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_deserialize() {
        let toml = r#"
            repository = "acme/widgets"
            parent_issue_labels = "epic, initiative"
            parent_issue_types = ["Epic", " Feature "]
            days_threshold = 14
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.repository.as_deref(), Some("acme/widgets"));
        assert_eq!(
            settings.parent_issue_labels.unwrap().tokens(),
            vec!["epic", "initiative"]
        );
        assert_eq!(
            settings.parent_issue_types.unwrap().tokens(),
            vec!["Epic", "Feature"]
        );
        assert_eq!(settings.days_threshold, Some(14));
        // unset options stay unset
        assert!(settings.update_message.is_none());
        assert!(settings.update_all_ancestors.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = Settings::from_toml("day_threshold = 3", Path::new("x.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overlay_prefers_upper_layer() {
        let file = Settings {
            repository: Some("acme/widgets".to_string()),
            days_threshold: Some(30),
            dry_run: Some(true),
            ..Default::default()
        };
        let cli = Settings {
            days_threshold: Some(7),
            ..Default::default()
        };

        let merged = file.overlay(cli);
        assert_eq!(merged.repository.as_deref(), Some("acme/widgets"));
        assert_eq!(merged.days_threshold, Some(7));
        assert_eq!(merged.dry_run, Some(true));
    }
}
