//! Validated run configuration
//!
//! A [`Config`] is built once per run and never changes afterwards; every
//! component receives it (or the part it needs) as an argument.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigError;
use crate::settings::{Settings, TokenList};

/// Days without descendant activity after which a parent is left alone
pub const DEFAULT_DAYS_THRESHOLD: u32 = 30;

/// Comment posted on refreshed parents
///
/// `{trigger}` becomes the triggering sub-issue (`#123`), `{days}` the
/// threshold.
pub const DEFAULT_UPDATE_MESSAGE: &str =
    "Sub-issue {trigger} has been active within the last {days} days, so this issue is still in progress.";

/// Upper bound on comments posted in parallel
pub const MAX_WRITE_CONCURRENCY: usize = 5;

/// GitHub's limit on label name length
const MAX_TOKEN_LEN: usize = 50;

/// Repository the run operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parse `owner/name`
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepository(value.to_string());
        let (owner, name) = value.trim().split_once('/').ok_or_else(invalid)?;
        let valid_part = |s: &str| !s.is_empty() && !s.contains('/') && !s.contains(char::is_whitespace);
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Labels and types that mark an issue as a parent to protect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentFilters {
    pub labels: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

impl ParentFilters {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.types.is_empty()
    }
}

/// How parents to protect are chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Issues carrying a configured label or issue type
    Filters(ParentFilters),
    /// Every ancestor of a recently active issue
    AllAncestors,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Filters(filters) => write!(
                f,
                "labels [{}] / types [{}]",
                filters.labels.iter().cloned().collect::<Vec<_>>().join(", "),
                filters.types.iter().cloned().collect::<Vec<_>>().join(", ")
            ),
            SelectionMode::AllAncestors => write!(f, "all ancestors"),
        }
    }
}

/// Immutable configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repository: Repository,
    /// GitHub Enterprise host, None for github.com
    pub host: Option<String>,
    pub selection: SelectionMode,
    pub days_threshold: u32,
    /// Message template, see [`DEFAULT_UPDATE_MESSAGE`]
    pub update_message: String,
    pub write_concurrency: usize,
    pub dry_run: bool,
}

/// Split a comma-separated list into trimmed, non-empty tokens
pub fn parse_token_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_tokens(
    list: Option<&TokenList>,
    kind: &'static str,
) -> Result<BTreeSet<String>, ConfigError> {
    let tokens = list.map(TokenList::tokens).unwrap_or_default();
    for token in &tokens {
        if token.chars().count() > MAX_TOKEN_LEN || token.chars().any(char::is_control) {
            return Err(ConfigError::InvalidToken {
                kind,
                token: token.clone(),
            });
        }
    }
    Ok(tokens.into_iter().collect())
}

impl Settings {
    /// Apply defaults and validate into a [`Config`]
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let repository = Repository::parse(
            self.repository
                .as_deref()
                .ok_or(ConfigError::MissingRepository)?,
        )?;

        let days_threshold = match self.days_threshold {
            None => DEFAULT_DAYS_THRESHOLD,
            Some(days) if days < 0 => return Err(ConfigError::NegativeThreshold(days)),
            Some(days) => {
                u32::try_from(days).map_err(|_| ConfigError::InvalidThreshold(days.to_string()))?
            }
        };

        let write_concurrency = match self.write_concurrency {
            None => 1,
            Some(n) if n >= 1 && n <= MAX_WRITE_CONCURRENCY as i64 => n as usize,
            Some(n) => {
                return Err(ConfigError::InvalidConcurrency {
                    got: n,
                    max: MAX_WRITE_CONCURRENCY,
                })
            }
        };

        let update_message = self
            .update_message
            .unwrap_or_else(|| DEFAULT_UPDATE_MESSAGE.to_string());
        if update_message.trim().is_empty() {
            return Err(ConfigError::EmptyMessage);
        }

        let filters = ParentFilters {
            labels: validate_tokens(self.parent_issue_labels.as_ref(), "label")?,
            types: validate_tokens(self.parent_issue_types.as_ref(), "issue type")?,
        };

        let selection = if self.update_all_ancestors.unwrap_or(false) {
            if !filters.is_empty() {
                log::info!("Updating all ancestors; configured labels and types are ignored");
            }
            SelectionMode::AllAncestors
        } else if filters.is_empty() {
            return Err(ConfigError::NoParentFilters);
        } else {
            SelectionMode::Filters(filters)
        };

        Ok(Config {
            repository,
            host: self.host.filter(|h| !h.trim().is_empty()),
            selection,
            days_threshold,
            update_message,
            write_concurrency,
            dry_run: self.dry_run.unwrap_or(false),
        })
    }
}
