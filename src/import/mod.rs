use crate::models::SessionRecord;
use serde::{Deserialize, Serialize};

pub mod csv;
pub mod schema;
pub mod validation;

pub use self::csv::CsvImporter;
pub use schema::{DetectedSchema, NormalizationReport, RawTable, SchemaNormalizer, Vendor};
pub use validation::RecordValidator;

/// Import behaviour switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Reject exports with headers that are neither canonical nor mapped
    #[serde(default)]
    pub strict_headers: bool,

    /// Restrict header mapping to these vendors (all shipped vendors when unset)
    #[serde(default)]
    pub vendors: Option<Vec<Vendor>>,
}

/// Typed records plus the header report for one imported export
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub records: Vec<SessionRecord>,
    pub report: NormalizationReport,
}
