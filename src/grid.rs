// src/grid.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::month::TargetMonth;

/// One aggregated timesheet row: the hours an engineer logged on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyHours {
    pub day: NaiveDate,
    pub engineer: String,
    pub hours: Decimal,
}

/// Turns a dotted account identifier into a display name: each dot-separated
/// part gets its first character uppercased and the parts are joined with
/// single spaces, so `jane.doe` becomes `Jane Doe` and `bob` becomes `Bob`.
///
/// An empty part (leading, trailing, or doubled dot) capitalizes to nothing
/// and leaves a stray space in the joined output. Published reports have
/// carried that quirk for years, so it stays.
pub fn display_name(identifier: &str) -> String {
    identifier
        .split('.')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Dense day-by-engineer hour matrix for one calendar month.
///
/// Rows are every calendar day of the month, ascending. Columns are engineer
/// display names in first-seen record order. A cell without a record is
/// absent and renders blank, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HourGrid {
    days: Vec<NaiveDate>,
    engineers: Vec<String>,
    cells: HashMap<NaiveDate, HashMap<String, Decimal>>,
}

impl HourGrid {
    /// Folds sparse records into the month's dense grid. Returns `None` when
    /// there is nothing to report. Later records win for a repeated
    /// `(day, engineer)` pair.
    pub fn build(records: &[DailyHours], month: &TargetMonth) -> Option<HourGrid> {
        if records.is_empty() {
            return None;
        }

        let mut engineers: Vec<String> = Vec::new();
        let mut cells: HashMap<NaiveDate, HashMap<String, Decimal>> = HashMap::new();
        for record in records {
            let name = display_name(&record.engineer);
            if !engineers.contains(&name) {
                engineers.push(name.clone());
            }
            // TODO: duplicates overwrite here; check with the report consumers
            // whether they expect summing instead.
            cells.entry(record.day).or_default().insert(name, record.hours);
        }

        Some(HourGrid {
            days: month.days(),
            engineers,
            cells,
        })
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn engineers(&self) -> &[String] {
        &self.engineers
    }

    /// Hours for one cell, `None` when the engineer logged nothing that day.
    /// Records dated outside the month sit in the map but never render; only
    /// their engineer column survives.
    pub fn hours(&self, day: NaiveDate, engineer: &str) -> Option<Decimal> {
        self.cells.get(&day).and_then(|row| row.get(engineer)).copied()
    }
}
