//! Spreadsheet extraction. Only the first worksheet is read; it is rendered as a
//! fixed-width text table with the first row as header and a 0-based row index.

use std::fmt::Display;
use std::io::Cursor;

use calamine::{Data, DataType, Reader, Xls, Xlsx};

use super::{DocumentKind, ExtractError};

const MISSING_CELL: &str = "NaN";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn extract(kind: DocumentKind, data: &[u8]) -> Result<String, ExtractError> {
    let cursor = Cursor::new(data.to_vec());
    let malformed = |reason: String| ExtractError::Malformed { kind, reason };

    let rows = match kind {
        DocumentKind::LegacySpreadsheet => {
            let workbook: Xls<_> = Xls::new(cursor).map_err(|e| malformed(e.to_string()))?;
            first_sheet_rows(workbook).map_err(malformed)?
        }
        _ => {
            let workbook: Xlsx<_> = Xlsx::new(cursor).map_err(|e| malformed(e.to_string()))?;
            first_sheet_rows(workbook).map_err(malformed)?
        }
    };

    Ok(render_table(&rows))
}

fn first_sheet_rows<R>(mut workbook: R) -> Result<Vec<Vec<Option<String>>>, String>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: Display,
{
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| e.to_string())?,
        None => return Ok(Vec::new()),
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::DateTime(dt) if dt.is_duration() => Some(
            cell.as_duration()
                .map(format_duration)
                .unwrap_or_else(|| cell.to_string()),
        ),
        Data::DurationIso(_) => Some(
            cell.as_duration()
                .map(format_duration)
                .unwrap_or_else(|| cell.to_string()),
        ),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(
            cell.as_datetime()
                .map(|dt| dt.format(DATETIME_FORMAT).to_string())
                .unwrap_or_else(|| cell.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// `1 days 02:30:00`, the way timedeltas print in a table.
fn format_duration(duration: chrono::Duration) -> String {
    let days = duration.num_days();
    let rest = (duration - chrono::Duration::days(days)).num_seconds();
    format!(
        "{days} days {:02}:{:02}:{:02}",
        rest / 3600,
        rest % 3600 / 60,
        rest % 60
    )
}

/// Renders rows as a right-aligned text table.
///
/// The first row names the columns (blank names become `Unnamed: <i>`); every
/// following row is prefixed with its 0-based index and blank cells render as
/// `NaN`. An empty sheet renders as an empty string.
pub fn render_table(rows: &[Vec<Option<String>>]) -> String {
    let Some((header_row, body)) = rows.split_first() else {
        return String::new();
    };

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let header: Vec<String> = (0..width)
        .map(|i| match header_row.get(i).cloned().flatten() {
            Some(name) => name,
            None => format!("Unnamed: {i}"),
        })
        .collect();

    let body: Vec<Vec<String>> = body
        .iter()
        .map(|row| {
            (0..width)
                .map(|i| {
                    row.get(i)
                        .cloned()
                        .flatten()
                        .unwrap_or_else(|| MISSING_CELL.to_string())
                })
                .collect()
        })
        .collect();

    let index: Vec<String> = (0..body.len()).map(|i| i.to_string()).collect();
    let index_width = index.iter().map(|s| s.chars().count()).max().unwrap_or(0);

    let column_widths: Vec<usize> = (0..width)
        .map(|col| {
            std::iter::once(&header[col])
                .chain(body.iter().map(|row| &row[col]))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(body.len() + 1);
    lines.push(render_line("", index_width, &header, &column_widths));
    for (idx, row) in index.iter().zip(&body) {
        lines.push(render_line(idx, index_width, row, &column_widths));
    }
    lines.join("\n")
}

fn render_line(index: &str, index_width: usize, cells: &[String], widths: &[usize]) -> String {
    let mut line = format!("{index:<index_width$}");
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str("  ");
        line.push_str(&pad_left(cell, *width));
    }
    line
}

fn pad_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut padded = " ".repeat(width.saturating_sub(len));
    padded.push_str(text);
    padded
}
