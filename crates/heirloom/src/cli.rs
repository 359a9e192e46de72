use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use heirloom_config::{Settings, TokenList};

/// heirloom: keep parent issues with active sub-issues from going stale
#[derive(Parser, Debug)]
#[command(name = "heirloom", version)]
#[command(about = "Comments on parent issues whose sub-issues were recently active")]
pub struct Cli {
    /// Config file (default: .heirloom.toml, then the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Repository as owner/name
    #[arg(short, long)]
    pub repo: Option<String>,

    /// GitHub Enterprise host
    #[arg(long)]
    pub host: Option<String>,

    /// GitHub token (default: environment or `gh auth token`)
    #[arg(long)]
    pub token: Option<String>,

    /// Comma-separated labels marking parent issues
    #[arg(short, long)]
    pub labels: Option<String>,

    /// Comma-separated issue types marking parent issues
    #[arg(short, long)]
    pub types: Option<String>,

    /// Protect every ancestor of a recently active issue, ignoring labels and types
    #[arg(long)]
    pub all_ancestors: bool,

    /// Days of sub-issue activity that keep a parent alive
    #[arg(short, long, allow_negative_numbers = true)]
    pub days: Option<i64>,

    /// Comment text; `{trigger}` and `{days}` are filled in
    #[arg(short, long)]
    pub message: Option<String>,

    /// Comments posted in parallel (1-5)
    #[arg(long, allow_negative_numbers = true)]
    pub concurrency: Option<i64>,

    /// Plan and log without posting
    #[arg(long)]
    pub dry_run: bool,

    /// Stop posting after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Options given on the command line, as the top settings layer
    pub fn settings(&self) -> Settings {
        Settings {
            repository: self.repo.clone(),
            host: self.host.clone(),
            parent_issue_labels: self.labels.clone().map(TokenList::Csv),
            parent_issue_types: self.types.clone().map(TokenList::Csv),
            update_all_ancestors: self.all_ancestors.then_some(true),
            days_threshold: self.days,
            update_message: self.message.clone(),
            write_concurrency: self.concurrency,
            dry_run: self.dry_run.then_some(true),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
