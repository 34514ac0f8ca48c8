// Library interface for SquadLoad modules
// The CLI, integration tests and benches all go through this crate root

pub mod acwr;
pub mod benchmarks;
pub mod config;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod import;
pub mod logging;
pub mod models;
pub mod summary;
pub mod weekly;
pub mod zones;

// Re-export commonly used types for convenience
pub use acwr::{AcwrCalculator, AcwrConfig, AcwrOutcome, AcwrResult, AcwrStatus, AcwrThresholds};
pub use benchmarks::{BenchmarkSet, BenchmarkSpec, FIELD_HOCKEY_V1};
pub use config::AppConfig;
pub use error::{Result, SquadLoadError};
pub use fixtures::{FixtureConfig, FixtureGenerator};
pub use import::{CsvImporter, ImportOptions, ImportOutcome, SchemaNormalizer, Vendor};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use summary::{
    LoadProgression, PlayerComparison, PlayerProfile, RecordFilter, SquadAcwrSummary,
    TeamOverview,
};
pub use weekly::{IsoWeekKey, WeeklyAggregate, WorkloadAggregator};
pub use zones::ZoneClassifier;
