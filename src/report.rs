// src/report.rs

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{error, info};

use crate::db::HoursSource;
use crate::drive::ReportStore;
use crate::error::ReportError;
use crate::excel::ReportWriter;
use crate::grid::HourGrid;
use crate::month::TargetMonth;
use crate::slack::Notifier;

/// Link text used in announcements when no upload happened.
pub const NO_LINK_PLACEHOLDER: &str = "(not uploaded)";

/// How a single project's run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectOutcome {
    /// The remote store already holds this month's report.
    AlreadyExists,
    /// No hours were recorded for the month; nothing was written.
    NoData,
    /// The report was written locally, and possibly uploaded.
    Completed {
        artifact: PathBuf,
        link: Option<String>,
    },
}

/// Per-project results of one run, in configuration order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(String, Result<ProjectOutcome, ReportError>)>,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, result)| matches!(result, Ok(ProjectOutcome::Completed { .. })))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, result)| {
                matches!(
                    result,
                    Ok(ProjectOutcome::AlreadyExists) | Ok(ProjectOutcome::NoData)
                )
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, result)| result.is_err())
            .count()
    }
}

/// Artifact filename for one project and month.
pub fn artifact_name(project: &str, month: &TargetMonth) -> String {
    format!("{}_{}.xlsx", project, month.label())
}

/// The fixed announcement template: project, month, and reference link.
pub fn notification_message(project: &str, month: &TargetMonth, link: Option<&str>) -> String {
    format!(
        "Hours report for project '{}' covering {} is ready: {}",
        project,
        month.label(),
        link.unwrap_or(NO_LINK_PLACEHOLDER)
    )
}

/// Whether a run may start today. An unset `min_day` or an active override
/// always allows it.
pub fn gate_allows(min_day: Option<u32>, force: bool, today: NaiveDate) -> bool {
    match min_day {
        Some(day) if !force => today.day() >= day,
        _ => true,
    }
}

/// Drives one report per project: skip-check, fetch, build, export, then the
/// optional distribution and announcement stages.
pub struct ReportRunner {
    source: Arc<dyn HoursSource>,
    writer: Arc<dyn ReportWriter>,
    store: Option<Arc<dyn ReportStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    out_dir: PathBuf,
    folder_id: Option<String>,
}

impl ReportRunner {
    pub fn new(
        source: Arc<dyn HoursSource>,
        writer: Arc<dyn ReportWriter>,
        out_dir: PathBuf,
    ) -> Self {
        Self {
            source,
            writer,
            store: None,
            notifier: None,
            out_dir,
            folder_id: None,
        }
    }

    /// Enables the remote existence check and upload stages.
    pub fn with_store(mut self, store: Arc<dyn ReportStore>, folder_id: String) -> Self {
        self.store = Some(store);
        self.folder_id = Some(folder_id);
        self
    }

    /// Enables the announcement stage.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Runs the full pipeline for one project. Ends early, without error,
    /// when the report already exists remotely or the month has no hours.
    pub async fn run_project(
        &self,
        project: &str,
        month: &TargetMonth,
    ) -> Result<ProjectOutcome, ReportError> {
        let filename = artifact_name(project, month);

        if let (Some(store), Some(folder_id)) = (&self.store, &self.folder_id) {
            info!("Checking the report folder for '{}'...", filename);
            if store.exists(folder_id, &filename).await? {
                info!("'{}' already exists remotely, skipping project", filename);
                return Ok(ProjectOutcome::AlreadyExists);
            }
        }

        let (range_start, range_end) = month.query_bounds();
        info!(
            "Fetching hours for project '{}' from {} to {}...",
            project, range_start, range_end
        );
        let records = self
            .source
            .fetch_daily_hours(project, range_start, range_end)
            .await?;

        info!(
            "Building the {} grid from {} records...",
            month.label(),
            records.len()
        );
        let grid = match HourGrid::build(&records, month) {
            Some(grid) => grid,
            None => {
                info!(
                    "No hours recorded for project '{}' in {}, nothing to export",
                    project,
                    month.label()
                );
                return Ok(ProjectOutcome::NoData);
            }
        };

        let artifact = self.out_dir.join(&filename);
        info!("Exporting report to {}...", artifact.display());
        self.writer.write_grid(&grid, &artifact, &month.label())?;

        // A failed upload leaves the exported file in place.
        let mut link = None;
        if let (Some(store), Some(folder_id)) = (&self.store, &self.folder_id) {
            info!("Uploading '{}' to the report folder...", filename);
            let url = store.upload(folder_id, &artifact, &filename).await?;
            info!("Upload finished: {}", url);
            link = Some(url);
        }

        if let Some(notifier) = &self.notifier {
            info!("Announcing the report for project '{}'...", project);
            notifier
                .notify(&notification_message(project, month, link.as_deref()))
                .await?;
        }

        Ok(ProjectOutcome::Completed { artifact, link })
    }

    /// Runs every project in order. Failures are logged and recorded; the
    /// remaining projects still run.
    pub async fn run_all(&self, projects: &[String], month: &TargetMonth) -> RunSummary {
        let mut summary = RunSummary::default();
        for project in projects {
            info!("--- Project '{}', month {} ---", project, month.label());
            let result = self.run_project(project, month).await;
            if let Err(e) = &result {
                error!("Project '{}' failed: {}", project, e);
            }
            summary.outcomes.push((project.clone(), result));
        }
        summary
    }
}
