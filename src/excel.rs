// src/excel.rs

use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use tracing::debug;

use crate::error::ReportError;
use crate::grid::HourGrid;

// Every column gets the same width; the reports have always shipped that way.
const COLUMN_WIDTH: f64 = 14.0;

/// Writes a finished grid to local spreadsheet storage.
pub trait ReportWriter: Send + Sync {
    /// Produces a single-sheet workbook at `dest` with the sheet named
    /// `sheet_label`.
    fn write_grid(&self, grid: &HourGrid, dest: &Path, sheet_label: &str)
        -> Result<(), ReportError>;
}

/// xlsx writer with dates down the left and one column per engineer. Cells
/// without logged hours stay blank.
pub struct XlsxReportWriter;

impl ReportWriter for XlsxReportWriter {
    fn write_grid(
        &self,
        grid: &HourGrid,
        dest: &Path,
        sheet_label: &str,
    ) -> Result<(), ReportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.set_name(sheet_label)?;

        // Header format
        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0x4472C4))
            .set_font_color(Color::White)
            .set_border(FormatBorder::Thin);

        // Header row: the date column, then one column per engineer
        worksheet.write_string_with_format(0, 0, "Date", &header_format)?;
        for (idx, engineer) in grid.engineers().iter().enumerate() {
            worksheet.write_string_with_format(0, (idx + 1) as u16, engineer, &header_format)?;
        }

        // Column widths
        for col in 0..=grid.engineers().len() {
            worksheet.set_column_width(col as u16, COLUMN_WIDTH)?;
        }

        // Data rows: one per calendar day, cells only where hours exist
        for (idx, day) in grid.days().iter().enumerate() {
            let row = (idx + 1) as u32;
            worksheet.write_string(row, 0, day.format("%Y-%m-%d").to_string())?;
            for (col, engineer) in grid.engineers().iter().enumerate() {
                if let Some(hours) = grid.hours(*day, engineer) {
                    let value = hours.to_f64().unwrap_or_default();
                    worksheet.write_number(row, (col + 1) as u16, value)?;
                }
            }
        }

        // Freeze top row
        worksheet.set_freeze_panes(1, 0)?;

        workbook.save(dest)?;
        debug!("Wrote sheet '{}' to {}", sheet_label, dest.display());
        Ok(())
    }
}
