use crate::models::CanonicalField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub mod csv;
pub mod json;

pub use self::csv::{export_acwr, export_records, export_records_to_path, export_weekly};
pub use json::export_json;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Date range filter for exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        let after_start = self.start.map_or(true, |start| date >= &start);
        let before_end = self.end.map_or(true, |end| date <= &end);
        after_start && before_end
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("No columns selected for export")]
    NoColumns,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Parse a comma-separated list of canonical headers, keeping the caller's order
pub fn parse_columns(list: &str) -> Result<Vec<CanonicalField>, ExportError> {
    let columns = list
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| c.parse().map_err(|_| ExportError::UnknownColumn(c.to_string())))
        .collect::<Result<Vec<CanonicalField>, _>>()?;

    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            ExportFormat::from_path(Path::new("out/acwr.json")).unwrap(),
            ExportFormat::Json
        );
        assert!(matches!(
            ExportFormat::from_path(Path::new("report.pdf")),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 2), None);
        assert!(!range.contains(&NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(range.contains(&NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
        assert!(range.contains(&NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }

    #[test]
    fn test_parse_columns_keeps_order() {
        let columns = parse_columns("Player Load (AU), Date,Player").unwrap();
        assert_eq!(
            columns,
            vec![
                CanonicalField::PlayerLoad,
                CanonicalField::Date,
                CanonicalField::Player
            ]
        );

        assert!(matches!(
            parse_columns("Date,Heart Rate"),
            Err(ExportError::UnknownColumn(ref c)) if c == "Heart Rate"
        ));
        assert!(matches!(parse_columns(" , "), Err(ExportError::NoColumns)));
    }
}
