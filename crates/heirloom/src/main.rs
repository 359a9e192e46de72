//! heirloom: protect parent issues from stale bots
//!
//! Reads configuration from `.heirloom.toml`, GitHub Action inputs and the
//! command line, then comments once on every parent issue whose sub-issues
//! were recently active.
//!
//! Exit codes: 0 when every comment was posted, 1 when some comment failed or
//! a linked issue could not be fetched, 2 when the run could not start or was
//! aborted.

mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gh_client::{RetryPolicy, RetryingIssueClient, TokenResolver, connect};
use heirloom_config::{Settings, settings_from_env};
use heirloom_core::{RunOptions, RunReport};
use log::{error, info, warn};
use tokio::sync::watch;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();
    init_logger(cli.verbose);
    if let Ok(path) = dotenv {
        log::debug!("Loaded .env file from: {:?}", path);
    }

    match execute(&cli).await {
        Ok(report) => {
            if let Err(err) = print_report(&report, cli.json) {
                error!("{:#}", err);
                return ExitCode::from(2);
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "info,heirloom=debug,heirloom_core=debug,heirloom_config=debug,gh_client=debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

async fn execute(cli: &Cli) -> Result<RunReport> {
    // defaults < config file < action inputs < command line
    let settings = Settings::load(cli.config.as_deref())?
        .overlay(settings_from_env(|key| std::env::var(key).ok())?)
        .overlay(cli.settings());
    let config = heirloom_core::prepare(settings)?;

    let token = TokenResolver::new(cli.token.clone())
        .get_token(config.host.as_deref())
        .await
        .context("No GitHub token available")?;
    let client = RetryingIssueClient::new(
        connect(token, config.host.as_deref())?,
        RetryPolicy::default(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher = tokio::spawn(watch_for_shutdown(shutdown_tx, cli.timeout()));

    let result = heirloom_core::run(&client, &config, RunOptions::new(&config, shutdown_rx)).await;
    watcher.abort();

    Ok(result?)
}

/// Signal shutdown on Ctrl-C or when `timeout` elapses
async fn watch_for_shutdown(shutdown: watch::Sender<bool>, timeout: Option<Duration>) {
    let deadline = async {
        match timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("Interrupted, not posting further comments"),
            Err(err) => {
                warn!("Cannot listen for Ctrl-C: {}", err);
                (&mut deadline).await;
                info!("Timeout reached, not posting further comments");
            }
        },
        _ = &mut deadline => info!("Timeout reached, not posting further comments"),
    }

    // the run may already have finished and dropped the receiver
    let _ = shutdown.send(true);
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
        println!("{}", rendered);
    } else {
        for action in &report.actions {
            println!("#{} <- #{}", action.target, action.trigger);
        }
        println!("{}", report);
    }
    Ok(())
}
