// src/month.rs

use chrono::{Datelike, NaiveDate};

use crate::error::ReportError;

/// The calendar month a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMonth {
    year: i32,
    month: u32,
}

impl TargetMonth {
    /// The month before the one containing `today`. A run early in a month
    /// reports on the month that just ended.
    pub fn preceding(today: NaiveDate) -> Self {
        if today.month() == 1 {
            Self {
                year: today.year() - 1,
                month: 12,
            }
        } else {
            Self {
                year: today.year(),
                month: today.month() - 1,
            }
        }
    }

    /// Parses a `YYYY-MM` label, e.g. from the command line.
    pub fn parse(value: &str) -> Result<Self, ReportError> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
            .map_err(|_| ReportError::InvalidMonth(value.to_string()))?;
        Ok(Self {
            year: first.year(),
            month: first.month(),
        })
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month is validated on construction")
    }

    /// First day of the following month.
    pub fn next_month_first(&self) -> NaiveDate {
        if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        }
        .expect("month arithmetic stays in range")
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next_month_first()
            .pred_opt()
            .expect("the first of a month always has a predecessor")
    }

    /// Every calendar day of the month, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = self.first_day();
        let end = self.next_month_first();
        while current < end {
            days.push(current);
            current = current.succ_opt().expect("date overflow while enumerating month days");
        }
        days
    }

    /// Fetch window for this month. The end bound is the first day of the
    /// following month, which the query treats inclusively at midnight.
    pub fn query_bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.next_month_first())
    }

    /// Label used for artifact names, sheet names, and log lines: `YYYY-MM`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}
