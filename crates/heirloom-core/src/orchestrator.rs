//! One run: fetch, index, select, plan, post, report

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use gh_client::IssueClient;
use heirloom_config::{Config, Settings};
use log::{info, warn};
use tokio::sync::watch;

use crate::activity::ActivityEvaluator;
use crate::error::RunError;
use crate::hierarchy::HierarchyGraph;
use crate::planner::{plan, RefreshAction};
use crate::report::RunReport;
use crate::selector::select_parents;

/// Execution knobs for the write phase
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Plan and log only
    pub dry_run: bool,
    /// Comments posted in parallel
    pub write_concurrency: usize,
    /// Set to `true` to abandon the fetch or stop issuing further comments
    pub shutdown: watch::Receiver<bool>,
}

impl RunOptions {
    pub fn new(config: &Config, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            dry_run: config.dry_run,
            write_concurrency: config.write_concurrency,
            shutdown,
        }
    }
}

enum Outcome {
    Posted,
    Failed(String),
    Cancelled,
}

/// Validate settings into a run configuration
///
/// Runs before any client exists, so an invalid configuration never causes
/// network traffic.
pub fn prepare(settings: Settings) -> Result<Config, RunError> {
    let config = settings.resolve()?;
    info!(
        "Configured {} ({}, threshold {} days{})",
        config.repository,
        config.selection,
        config.days_threshold,
        if config.dry_run { ", dry run" } else { "" }
    );
    Ok(config)
}

/// Protect the parents of recently active issues in the configured repository
///
/// Fetch failures and hierarchy errors abort the run. Linked issues the
/// client could not fetch are recorded as fetch failures. A failed comment
/// is recorded in the report and the remaining comments are still
/// attempted. Shutdown during the fetch returns a cancelled report with
/// nothing planned.
pub async fn run(
    client: &dyn IssueClient,
    config: &Config,
    options: RunOptions,
) -> Result<RunReport, RunError> {
    run_at(client, config, options, Utc::now()).await
}

async fn run_at(
    client: &dyn IssueClient,
    config: &Config,
    options: RunOptions,
    now: DateTime<Utc>,
) -> Result<RunReport, RunError> {
    let owner = config.repository.owner.as_str();
    let name = config.repository.name.as_str();

    let mut shutdown = options.shutdown.clone();
    if *shutdown.borrow() {
        warn!("Run cancelled before fetching issues, nothing planned");
        return Ok(cancelled_report());
    }
    let fetched = tokio::select! {
        result = client.fetch_issues(owner, name) => result,
        _ = shutdown_requested(&mut shutdown) => {
            warn!("Run cancelled while fetching issues, nothing planned");
            return Ok(cancelled_report());
        }
    };
    let outcome = fetched.map_err(|source| RunError::Fetch {
        repository: config.repository.to_string(),
        source,
    })?;
    info!(
        "Fetched {} issues from {}",
        outcome.issues.len(),
        config.repository
    );
    for missing in &outcome.unresolved {
        warn!(
            "Could not fetch linked issue #{}, its ancestors may go unprotected: {}",
            missing.number, missing.error
        );
    }

    let graph = HierarchyGraph::build(outcome.issues)?;
    let evaluator = ActivityEvaluator::new(config.days_threshold, now);

    let selected = select_parents(&graph, &config.selection, &evaluator);
    info!("Selected {} parent issue(s)", selected.len());

    let actions = plan(&graph, &selected, &evaluator, &config.update_message);
    let mut report = RunReport::new(selected.len(), &actions);
    for missing in &outcome.unresolved {
        report.record_fetch_failure(missing.number, missing.error.to_string());
    }

    if options.dry_run {
        for action in &actions {
            info!(
                "Dry run: would comment on #{} (trigger #{})",
                action.target, action.trigger
            );
            report.record_skipped();
        }
        info!("Run finished: {}", report);
        return Ok(report);
    }

    let shutdown = &options.shutdown;
    let outcomes: Vec<(u64, Outcome)> = stream::iter(actions.iter())
        .map(|action: &RefreshAction| async move {
            if *shutdown.borrow() {
                return (action.target, Outcome::Cancelled);
            }
            let outcome = match client
                .post_comment(owner, name, action.target, &action.message)
                .await
            {
                Ok(()) => Outcome::Posted,
                Err(err) => Outcome::Failed(err.to_string()),
            };
            (action.target, outcome)
        })
        .buffer_unordered(options.write_concurrency.max(1))
        .collect()
        .await;

    for (target, outcome) in outcomes {
        match outcome {
            Outcome::Posted => {
                info!("Commented on #{}", target);
                report.record_success();
            }
            Outcome::Failed(cause) => {
                warn!("Failed to comment on #{}: {}", target, cause);
                report.record_failure(target, cause);
            }
            Outcome::Cancelled => {
                report.cancelled = true;
                report.record_skipped();
            }
        }
    }
    report.failures.sort_by_key(|f| f.issue);

    if report.cancelled {
        warn!(
            "Run cancelled, {} comment(s) not posted",
            report.actions_skipped
        );
    }
    info!("Run finished: {}", report);
    Ok(report)
}

fn cancelled_report() -> RunReport {
    RunReport {
        cancelled: true,
        ..Default::default()
    }
}

/// Resolves once shutdown is requested; never if the sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let sender_gone = shutdown.wait_for(|stop| *stop).await.is_err();
    if sender_gone {
        std::future::pending::<()>().await;
    }
}
