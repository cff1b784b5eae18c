mod app;
mod config;
mod domain;
mod error;
mod repo;
mod usecase;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use time::OffsetDateTime;

use app::App;
use config::{Config, Inputs};
use repo::github::GithubPullRequestRepo;

#[derive(Parser, Debug)]
#[command(author, version, about = "review-reminder — nudge reviewers on stale pull requests", long_about = None)]
struct Args {
    #[command(flatten)]
    inputs: Inputs,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_inputs(args.inputs)?;
    info!(
        "checking {} ({:?} model{})",
        config.repo,
        config.policy.time_model(),
        if config.dry_run { ", dry run" } else { "" }
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let report = rt.block_on(async move {
        let repo = GithubPullRequestRepo::connect(
            config.token,
            config.api_base.as_deref(),
            config.repo,
        )?;
        let app = App::new(repo, config.policy, config.dry_run);
        app.run(OffsetDateTime::now_utc()).await
    })?;

    info!(
        "done: {} inspected, {} reminded, {} skipped",
        report.inspected,
        report.reminded.len(),
        report.skipped()
    );
    Ok(())
}

/// Log the failure and, inside GitHub Actions, annotate the step with it.
fn report_failure(message: &str) {
    error!("{message}");
    if std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
        println!("::error::{}", escape_workflow_data(message));
    }
}

// Workflow command data must not contain raw newlines.
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
