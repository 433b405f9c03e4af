// TesterMatch - core/export.rs
//
// Rendering of collapsed query results: fixed-width table, CSV, and JSON.
// Core layer: writes to any Write trait object.

use crate::core::model::DisplayRow;
use crate::util::constants::{
    CSV_EXPORT_HEADERS, TABLE_COLUMN_WIDTH, TABLE_HEADERS, TABLE_SEPARATORS,
};
use crate::util::error::ExportError;
use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;

/// How query results are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(other.to_string()),
        }
    }
}

/// Write rows in the requested format.
pub fn write_rows<W: Write>(
    rows: &[DisplayRow],
    format: OutputFormat,
    mut writer: W,
) -> Result<(), ExportError> {
    match format {
        OutputFormat::Table => writer
            .write_all(render_table(rows).as_bytes())
            .map_err(ExportError::Io),
        OutputFormat::Csv => export_csv(rows, writer).map(|_| ()),
        OutputFormat::Json => {
            export_json(rows, &mut writer)?;
            writeln!(writer).map_err(ExportError::Io)
        }
    }
}

/// Render rows as a three-column table with a header and dashed separator.
///
/// Every cell is left-aligned and padded to the column width; longer values
/// push the following columns right rather than being truncated.
pub fn render_table(rows: &[DisplayRow]) -> String {
    let mut out = String::new();
    push_line(&mut out, TABLE_HEADERS[0], TABLE_HEADERS[1], TABLE_HEADERS[2]);
    push_line(
        &mut out,
        TABLE_SEPARATORS[0],
        TABLE_SEPARATORS[1],
        TABLE_SEPARATORS[2],
    );
    for row in rows {
        push_line(
            &mut out,
            &row.first_name,
            &row.last_name,
            &row.bug_count.to_string(),
        );
    }
    out
}

fn push_line(out: &mut String, first: &str, second: &str, third: &str) {
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "{first:<w$} {second:<w$} {third:<w$}",
        w = TABLE_COLUMN_WIDTH
    );
}

/// Export rows to CSV: `first_name, last_name, bug_count`.
pub fn export_csv<W: Write>(rows: &[DisplayRow], writer: W) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(CSV_EXPORT_HEADERS)
        .map_err(ExportError::Csv)?;

    for row in rows {
        csv_writer
            .write_record([
                row.first_name.as_str(),
                row.last_name.as_str(),
                &row.bug_count.to_string(),
            ])
            .map_err(ExportError::Csv)?;
    }

    csv_writer.flush().map_err(ExportError::Io)?;
    Ok(rows.len())
}

/// Export rows to JSON (pretty-printed array of objects).
pub fn export_json<W: Write>(rows: &[DisplayRow], writer: W) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, rows).map_err(ExportError::Json)?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(first: &str, last: &str, bugs: usize) -> DisplayRow {
        DisplayRow {
            first_name: first.to_string(),
            last_name: last.to_string(),
            bug_count: bugs,
        }
    }

    #[test]
    fn test_table_layout() {
        let table = render_table(&[row("Ann", "Lee", 12)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "First Name Last Name  Experience");
        assert_eq!(lines[1], "---------- ---------  ----------");
        assert_eq!(lines[2], "Ann        Lee        12        ");
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_long_names_are_not_truncated() {
        let table = render_table(&[row("Bartholomew", "Lee", 1)]);
        assert!(table.contains("Bartholomew Lee"));
    }

    #[test]
    fn test_csv_export() {
        let rows = vec![row("Ann", "Lee", 2), row("Bob", "Ray", 1)];
        let mut buf = Vec::new();
        let count = export_csv(&rows, &mut buf).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("first_name,last_name,bug_count\n"));
        assert!(output.contains("Ann,Lee,2"));
    }

    #[test]
    fn test_json_export() {
        let rows = vec![row("Ann", "Lee", 2)];
        let mut buf = Vec::new();
        write_rows(&rows, OutputFormat::Json, &mut buf).unwrap();

        let parsed: Vec<DisplayRow> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
