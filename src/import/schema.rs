use crate::models::CanonicalField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// GPS vendors whose export headers are known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Pole-mounted wearable exports
    StatSports,
    /// Elite-team wearable exports
    Catapult,
}

impl Vendor {
    pub const ALL: [Vendor; 2] = [Vendor::StatSports, Vendor::Catapult];

    /// Vendor header → canonical field pairs
    pub fn mappings(&self) -> &'static [(&'static str, CanonicalField)] {
        match self {
            Vendor::StatSports => STATSPORTS_MAPPINGS,
            Vendor::Catapult => CATAPULT_MAPPINGS,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::StatSports => f.write_str("STATSports"),
            Vendor::Catapult => f.write_str("Catapult"),
        }
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "statsports" | "stat_sports" => Ok(Vendor::StatSports),
            "catapult" => Ok(Vendor::Catapult),
            _ => Err(format!("Unknown vendor: {}", s)),
        }
    }
}

const STATSPORTS_MAPPINGS: &[(&str, CanonicalField)] = &[
    ("Player Name", CanonicalField::Player),
    ("Total Distance", CanonicalField::TotalDistance),
    ("High Speed Running", CanonicalField::HsrDistance),
    ("Sprint Distance", CanonicalField::SprintDistance),
    ("Accels", CanonicalField::Accelerations),
    ("Decels", CanonicalField::Decelerations),
    ("Dynamic Stress Load", CanonicalField::PlayerLoad),
];

const CATAPULT_MAPPINGS: &[(&str, CanonicalField)] = &[
    ("Athlete Name", CanonicalField::Player),
    ("Total Player Load", CanonicalField::PlayerLoad),
    ("Velocity Band 5 Total Distance", CanonicalField::HsrDistance),
    ("Velocity Band 6 Total Distance", CanonicalField::SprintDistance),
    ("Acceleration Band 3 Total Effort Count", CanonicalField::Accelerations),
    ("Deceleration Band 3 Total Effort Count", CanonicalField::Decelerations),
];

/// Which header vocabulary a table uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DetectedSchema {
    /// No vendor headers present
    Canonical,
    /// Headers from exactly one vendor
    Vendor(Vendor),
    /// Headers from more than one vendor
    Mixed,
}

impl fmt::Display for DetectedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedSchema::Canonical => f.write_str("canonical"),
            DetectedSchema::Vendor(vendor) => write!(f, "{}", vendor),
            DetectedSchema::Mixed => f.write_str("mixed"),
        }
    }
}

/// A table of string cells with a header row, as read from an export
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { headers, rows }
    }
}

/// What normalization did to a header row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub schema: DetectedSchema,
    /// (source header, canonical header) for every rename applied
    pub renamed: Vec<(String, String)>,
    /// Headers that are neither canonical nor a known vendor header
    pub unrecognized: Vec<String>,
}

/// Renames vendor export headers onto the canonical schema
pub struct SchemaNormalizer {
    column_mapping: HashMap<String, CanonicalField>,
    vendor_of: HashMap<String, Vendor>,
}

impl SchemaNormalizer {
    /// Normalizer that knows every shipped vendor
    pub fn new() -> Self {
        Self::for_vendors(&Vendor::ALL)
    }

    /// Normalizer restricted to the given vendors
    pub fn for_vendors(vendors: &[Vendor]) -> Self {
        let mut column_mapping = HashMap::new();
        let mut vendor_of = HashMap::new();

        for vendor in vendors {
            for (source, target) in vendor.mappings() {
                column_mapping.insert(source.to_string(), *target);
                vendor_of.insert(source.to_string(), *vendor);
            }
        }

        Self {
            column_mapping,
            vendor_of,
        }
    }

    /// Canonical header for a source header, if it is a known vendor header
    pub fn canonical_for(&self, header: &str) -> Option<CanonicalField> {
        self.column_mapping.get(header.trim()).copied()
    }

    /// Rename a single header; unknown headers come back unchanged
    pub fn normalize_header(&self, header: &str) -> String {
        self.canonical_for(header)
            .map(|field| field.header().to_string())
            .unwrap_or_else(|| header.to_string())
    }

    /// Identify the vendor vocabulary used by a header row
    pub fn detect_vendor(&self, headers: &[String]) -> DetectedSchema {
        let mut seen: Vec<Vendor> = Vec::new();
        for header in headers {
            if let Some(vendor) = self.vendor_of.get(header.trim()) {
                if !seen.contains(vendor) {
                    seen.push(*vendor);
                }
            }
        }

        match seen.as_slice() {
            [] => DetectedSchema::Canonical,
            [vendor] => DetectedSchema::Vendor(*vendor),
            _ => DetectedSchema::Mixed,
        }
    }

    /// Rename known vendor headers. Rows and column order are untouched.
    pub fn normalize(&self, table: RawTable) -> RawTable {
        self.normalize_with_report(table).0
    }

    /// Rename known vendor headers and report what changed
    pub fn normalize_with_report(&self, table: RawTable) -> (RawTable, NormalizationReport) {
        let schema = self.detect_vendor(&table.headers);
        let mut renamed = Vec::new();
        let mut unrecognized = Vec::new();

        let headers = table
            .headers
            .into_iter()
            .map(|header| match self.canonical_for(&header) {
                Some(field) => {
                    let target = field.header().to_string();
                    renamed.push((header, target.clone()));
                    target
                }
                None => {
                    if CanonicalField::from_header(header.trim()).is_none() {
                        unrecognized.push(header.clone());
                    }
                    header
                }
            })
            .collect();

        for header in &unrecognized {
            warn!(header = %header, "Column is neither canonical nor a known vendor header");
        }
        debug!(
            schema = %schema,
            renamed = renamed.len(),
            unrecognized = unrecognized.len(),
            "Normalized export headers"
        );

        (
            RawTable {
                headers,
                rows: table.rows,
            },
            NormalizationReport {
                schema,
                renamed,
                unrecognized,
            },
        )
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
