//! GitHub Action input overlay
//!
//! A workflow step passes its `with:` inputs as `INPUT_<NAME>` environment
//! variables, upper-cased with hyphens kept (`INPUT_DAYS-THRESHOLD`). Inputs
//! left blank in the workflow arrive as empty strings and count as unset.

use crate::error::ConfigError;
use crate::settings::{Settings, TokenList};

pub const REPO_OWNER: &str = "INPUT_REPO-OWNER";
pub const REPO_NAME: &str = "INPUT_REPO-NAME";
pub const PARENT_ISSUE_LABELS: &str = "INPUT_PARENT-ISSUE-LABELS";
pub const PARENT_ISSUE_TYPES: &str = "INPUT_PARENT-ISSUE-TYPES";
pub const UPDATE_ALL_ANCESTORS: &str = "INPUT_UPDATE-ALL-ANCESTORS";
pub const DAYS_THRESHOLD: &str = "INPUT_DAYS-THRESHOLD";
pub const UPDATE_MESSAGE: &str = "INPUT_UPDATE-MESSAGE";
pub const WRITE_CONCURRENCY: &str = "INPUT_WRITE-CONCURRENCY";
pub const DRY_RUN: &str = "INPUT_DRY-RUN";
/// Set by the Actions runner to the repository running the workflow
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";

/// Read settings from environment variables
///
/// `lookup` is usually `|k| std::env::var(k).ok()`; tests pass a map.
pub fn settings_from_env<F>(lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let repository = match (get(REPO_OWNER), get(REPO_NAME)) {
        (Some(owner), Some(name)) => Some(format!("{}/{}", owner.trim(), name.trim())),
        _ => get(GITHUB_REPOSITORY),
    };

    let days_threshold = get(DAYS_THRESHOLD)
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidThreshold(v.clone()))
        })
        .transpose()?;

    let write_concurrency = get(WRITE_CONCURRENCY)
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: WRITE_CONCURRENCY.to_string(),
                    value: v.clone(),
                })
        })
        .transpose()?;

    Ok(Settings {
        repository,
        host: None,
        parent_issue_labels: get(PARENT_ISSUE_LABELS).map(TokenList::Csv),
        parent_issue_types: get(PARENT_ISSUE_TYPES).map(TokenList::Csv),
        update_all_ancestors: get(UPDATE_ALL_ANCESTORS)
            .map(|v| parse_bool(UPDATE_ALL_ANCESTORS, &v))
            .transpose()?,
        days_threshold,
        update_message: get(UPDATE_MESSAGE),
        write_concurrency,
        dry_run: get(DRY_RUN).map(|v| parse_bool(DRY_RUN, &v)).transpose()?,
    })
}

/// Parse a workflow boolean input (`true`/`false`, any case)
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
