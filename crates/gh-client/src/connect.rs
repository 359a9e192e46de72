//! Token resolution and client construction
//!
//! Resolves a GitHub token the way a workflow or a developer shell provides
//! it, and builds an octocrab-backed client for github.com or an enterprise
//! host.

use crate::{OctocrabClient, DEFAULT_HOST};
use anyhow::{Context, Result};
use log::{debug, info};
use octocrab::Octocrab;
use std::sync::Arc;

/// Environment variable a GitHub Action input `github-token` arrives in
pub const ACTION_TOKEN_VAR: &str = "INPUT_GITHUB-TOKEN";

/// Resolves GitHub tokens
///
/// Tries multiple sources in order:
/// 1. An explicitly configured token
/// 2. The `github-token` action input (`INPUT_GITHUB-TOKEN`)
/// 3. Host-specific env var (e.g., `GITHUB_TOKEN_GHE_EXAMPLE_COM`)
/// 4. Generic `GITHUB_TOKEN` or `GH_TOKEN` (github.com only)
/// 5. `gh auth token --hostname {host}` command
#[derive(Debug, Clone, Default)]
pub struct TokenResolver {
    explicit: Option<String>,
}

impl TokenResolver {
    /// Create a new token resolver, preferring `explicit` when given
    pub fn new(explicit: Option<String>) -> Self {
        Self {
            explicit: explicit.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Get a token for the given host
    ///
    /// # Arguments
    ///
    /// * `host` - The GitHub host (None = github.com)
    pub async fn get_token(&self, host: Option<&str>) -> Result<String> {
        let host = host.unwrap_or(DEFAULT_HOST);

        if let Some(token) = &self.explicit {
            debug!("Using explicitly configured token for host {}", host);
            return Ok(token.clone());
        }

        if let Some(token) = non_empty_env(ACTION_TOKEN_VAR) {
            debug!("Using token from action input for host {}", host);
            return Ok(token);
        }

        let env_key = host_env_key(host);
        if let Some(token) = non_empty_env(&env_key) {
            debug!("Using token from env var {} for host {}", env_key, host);
            return Ok(token);
        }

        if host == DEFAULT_HOST {
            if let Some(token) = non_empty_env("GITHUB_TOKEN").or_else(|| non_empty_env("GH_TOKEN")) {
                debug!("Using default token (GITHUB_TOKEN/GH_TOKEN) for github.com");
                return Ok(token);
            }
        }

        debug!("Trying gh auth token for host {}", host);
        let output = tokio::process::Command::new("gh")
            .args(["auth", "token", "--hostname", host])
            .output()
            .await
            .context("Failed to run 'gh auth token'")?;

        if output.status.success() {
            let token = String::from_utf8(output.stdout)
                .context("Invalid UTF-8 in gh auth token output")?
                .trim()
                .to_string();
            if !token.is_empty() {
                debug!("Using token from gh CLI for host {}", host);
                return Ok(token);
            }
        }

        Err(anyhow::anyhow!(
            "No token found for host '{}'. \
             Set {}, GITHUB_TOKEN or run 'gh auth login --hostname {}'",
            host,
            env_key,
            host
        ))
    }
}

/// Host-specific token variable name, e.g. `GITHUB_TOKEN_GHE_EXAMPLE_COM`
fn host_env_key(host: &str) -> String {
    format!(
        "GITHUB_TOKEN_{}",
        host.replace(['.', '-'], "_").to_uppercase()
    )
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Build a client for the given host
///
/// # Arguments
///
/// * `token` - GitHub token with `issues: write` permission
/// * `host` - The GitHub host (None = github.com)
pub fn connect(token: String, host: Option<&str>) -> Result<OctocrabClient> {
    let effective_host = host.unwrap_or(DEFAULT_HOST);
    info!("Creating GitHub client for host: {}", effective_host);

    let mut builder = Octocrab::builder().personal_token(token);

    if effective_host != DEFAULT_HOST {
        let uri = format!("https://{}/api/v3", effective_host);
        builder = builder.base_uri(&uri).context("Failed to set base URI")?;
    }

    let octocrab = builder.build().context("Failed to build Octocrab client")?;
    Ok(OctocrabClient::new(Arc::new(octocrab)))
}
