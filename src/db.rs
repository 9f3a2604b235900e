// src/db.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::Row;
use tracing::debug;

use crate::error::ReportError;
use crate::grid::DailyHours;

// Aggregation and rounding happen in the database: duration is stored in
// seconds and CEIL(... / 3600) rounds each (engineer, day) total up to whole
// hours. The CAST pins the column to DECIMAL so row decoding is strict.
const FETCH_DAILY_HOURS_SQL: &str = "\
SELECT \
  DATE(FROM_UNIXTIME(`timesheet`.`start`)) AS `day` \
  , `user`.`name` AS `engineer` \
  , CAST(CEIL(SUM(`timesheet`.`duration`) / (60 * 60)) AS DECIMAL(10, 2)) AS `hours` \
FROM `ki_timeSheet` AS `timesheet` \
INNER JOIN `ki_projects` AS `project` ON `timesheet`.`projectID` = `project`.`projectID` \
INNER JOIN `ki_users` AS `user` ON `user`.`userID` = `timesheet`.`userID` \
WHERE `timesheet`.`start` BETWEEN UNIX_TIMESTAMP(?) AND UNIX_TIMESTAMP(?) \
AND `project`.`name` = ? \
GROUP BY `engineer`, `day` \
ORDER BY `engineer`, `day`";

/// Opens the shared connection pool used for every project in a run.
pub async fn connect(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
}

/// Read side of the timesheet store.
#[async_trait]
pub trait HoursSource: Send + Sync {
    /// Aggregated hours per engineer per day for one project inside a date
    /// window. Rows arrive ordered by engineer, then day.
    async fn fetch_daily_hours(
        &self,
        project: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<DailyHours>, ReportError>;
}

pub struct MySqlHoursSource {
    pool: MySqlPool,
}

impl MySqlHoursSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HoursSource for MySqlHoursSource {
    async fn fetch_daily_hours(
        &self,
        project: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<DailyHours>, ReportError> {
        let rows = sqlx::query(FETCH_DAILY_HOURS_SQL)
            .bind(range_start)
            .bind(range_end)
            .bind(project)
            .fetch_all(&self.pool)
            .await?;

        debug!("Query returned {} rows for project '{}'", rows.len(), project);

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(DailyHours {
                day: row.try_get("day")?,
                engineer: row.try_get("engineer")?,
                hours: row.try_get("hours")?,
            });
        }
        Ok(records)
    }
}
