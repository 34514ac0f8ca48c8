use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ImportError, Result};
use crate::import::schema::{RawTable, SchemaNormalizer};
use crate::import::validation::RecordValidator;
use crate::import::{ImportOptions, ImportOutcome};

/// CSV importer for vendor and canonical GPS exports
pub struct CsvImporter {
    normalizer: SchemaNormalizer,
    options: ImportOptions,
}

impl CsvImporter {
    pub fn new() -> Self {
        Self::with_options(ImportOptions::default())
    }

    pub fn with_options(options: ImportOptions) -> Self {
        let normalizer = match &options.vendors {
            Some(vendors) => SchemaNormalizer::for_vendors(vendors),
            None => SchemaNormalizer::new(),
        };
        Self {
            normalizer,
            options,
        }
    }

    /// Whether a path looks like a CSV export
    pub fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }

    /// Read a header row and string cells without interpreting them
    pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawTable::new(headers, rows))
    }

    /// Import an export file from disk
    pub fn import_file(&self, file_path: &Path) -> Result<ImportOutcome> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let file = std::fs::File::open(file_path)?;
        let outcome = self.import_reader(file, &file_path.display().to_string())?;

        info!(
            file = %file_path.display(),
            records = outcome.records.len(),
            schema = %outcome.report.schema,
            "Imported GPS export"
        );
        Ok(outcome)
    }

    /// Import from any reader; `source_name` is used in error messages
    pub fn import_reader<R: Read>(&self, reader: R, source_name: &str) -> Result<ImportOutcome> {
        let raw = Self::read_table(reader)?;
        self.import_table(raw, source_name)
    }

    /// Normalize and validate an in-memory table
    pub fn import_table(&self, raw: RawTable, source_name: &str) -> Result<ImportOutcome> {
        if raw.headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportError::EmptyTable {
                source_name: source_name.to_string(),
            }
            .into());
        }

        let (table, report) = self.normalizer.normalize_with_report(raw);

        if self.options.strict_headers && !report.unrecognized.is_empty() {
            return Err(ImportError::UnrecognizedColumns {
                columns: report.unrecognized.clone(),
            }
            .into());
        }

        let records = RecordValidator::validate_table(&table)?;
        debug!(source = source_name, records = records.len(), "Validated session rows");

        Ok(ImportOutcome { records, report })
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}
