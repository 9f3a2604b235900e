// src/main.rs

mod config;
mod db;
mod drive;
mod error;
mod excel;
mod grid;
mod grid_tests;
mod month;
mod report;
mod slack;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ReportConfig;
use crate::drive::DriveStore;
use crate::excel::XlsxReportWriter;
use crate::month::TargetMonth;
use crate::report::{gate_allows, ReportRunner};
use crate::slack::SlackNotifier;

// Exit code for runs suppressed by the day-of-month gate.
const EXIT_TOO_EARLY: i32 = 2;
const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "hourgrid",
    about = "Builds and distributes monthly engineer-hour reports"
)]
struct Cli {
    /// Target month as YYYY-MM. Defaults to the previous calendar month.
    #[arg(long)]
    month: Option<String>,

    /// Bypass the day-of-month gate for this run.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config =
        ReportConfig::from_env().context("Failed to load configuration from environment")?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hourgrid...");
    config.validate()?;

    let today = Local::now().date_naive();
    let month = match &cli.month {
        Some(value) => TargetMonth::parse(value)?,
        None => TargetMonth::preceding(today),
    };
    info!(
        "Target month: {} ({} through {})",
        month.label(),
        month.first_day(),
        month.last_day()
    );

    if !gate_allows(config.min_report_day, config.force_run || cli.force, today) {
        warn!(
            "Skipping run: today is day {} but reports start on day {}. Set FORCE_RUN=true or pass --force to override.",
            today.day(),
            config.min_report_day.unwrap_or_default()
        );
        std::process::exit(EXIT_TOO_EARLY);
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create output directory '{}'", config.data_dir))?;

    info!("Connecting to the timesheet database...");
    let pool = db::connect(&config.database_url)
        .await
        .context("Failed to connect to the timesheet database")?;

    let mut runner = ReportRunner::new(
        Arc::new(db::MySqlHoursSource::new(pool)),
        Arc::new(XlsxReportWriter),
        PathBuf::from(&config.data_dir),
    );

    if config.upload_enabled || config.notify_enabled {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        if config.upload_enabled {
            let credentials = config
                .drive_credentials()
                .ok_or_else(|| anyhow!("Drive credentials missing after validation"))?;
            let folder_id = config
                .drive_folder_id
                .clone()
                .ok_or_else(|| anyhow!("Drive folder id missing after validation"))?;
            runner = runner.with_store(
                Arc::new(DriveStore::new(credentials, http_client.clone())),
                folder_id,
            );
        }

        if config.notify_enabled {
            let webhook_url = config
                .slack_webhook_url
                .clone()
                .ok_or_else(|| anyhow!("Slack webhook URL missing after validation"))?;
            runner = runner.with_notifier(Arc::new(SlackNotifier::new(http_client, webhook_url)));
        }
    }

    let projects = config.project_list();
    info!(
        "Running reports for {} project(s): {}",
        projects.len(),
        projects.join(", ")
    );

    let summary = runner.run_all(&projects, &month).await;

    info!(
        "Run finished: {} completed, {} skipped, {} failed",
        summary.completed(),
        summary.skipped(),
        summary.failed()
    );

    Ok(())
}
