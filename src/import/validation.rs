use crate::error::{ImportError, SquadLoadError, ValidationError};
use crate::import::schema::RawTable;
use crate::models::{CanonicalField, Position, SessionRecord, SessionType};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Positions of canonical columns within a normalized header row
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    indices: HashMap<CanonicalField, usize>,
}

impl ColumnLayout {
    /// Resolve canonical columns, failing on missing required or duplicated columns
    pub fn resolve(headers: &[String]) -> Result<Self, ImportError> {
        let mut indices = HashMap::new();

        for (i, header) in headers.iter().enumerate() {
            if let Some(field) = CanonicalField::from_header(header.trim()) {
                if indices.insert(field, i).is_some() {
                    return Err(ImportError::DuplicateColumn {
                        column: field.header().to_string(),
                    });
                }
            }
        }

        if let Some(missing) = CanonicalField::ALL
            .iter()
            .find(|field| field.is_required() && !indices.contains_key(field))
        {
            return Err(ImportError::MissingColumn {
                column: missing.header().to_string(),
            });
        }

        Ok(Self { indices })
    }

    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn has(&self, field: CanonicalField) -> bool {
        self.indices.contains_key(&field)
    }
}

/// Converts normalized rows into typed session records, failing on the first bad cell
pub struct RecordValidator;

impl RecordValidator {
    /// Validate every row of a normalized table
    pub fn validate_table(table: &RawTable) -> Result<Vec<SessionRecord>, SquadLoadError> {
        let layout = ColumnLayout::resolve(&table.headers)?;
        let expected = table.headers.len();

        let mut records = Vec::with_capacity(table.rows.len());
        for (i, cells) in table.rows.iter().enumerate() {
            let row = i + 1;
            if cells.len() != expected {
                return Err(ImportError::RaggedRow {
                    row,
                    expected,
                    found: cells.len(),
                }
                .into());
            }
            records.push(Self::parse_row(row, cells, &layout)?);
        }

        Ok(records)
    }

    /// Build a record from one row of cells
    pub fn parse_row(
        row: usize,
        cells: &[String],
        layout: &ColumnLayout,
    ) -> Result<SessionRecord, ValidationError> {
        let cell = |field: CanonicalField| -> Option<&str> {
            layout
                .index_of(field)
                .and_then(|i| cells.get(i))
                .map(|value| value.trim())
        };
        let required = |field: CanonicalField| cell(field).unwrap_or_default();

        let date_value = required(CanonicalField::Date);
        let date = Self::parse_date(date_value).ok_or_else(|| ValidationError::InvalidDate {
            row,
            value: date_value.to_string(),
        })?;

        let athlete_id = required(CanonicalField::Player);
        if athlete_id.is_empty() {
            return Err(ValidationError::MissingValue {
                row,
                column: CanonicalField::Player.header().to_string(),
            });
        }

        let position = Self::parse_optional_enum::<Position>(
            row,
            CanonicalField::Position,
            cell(CanonicalField::Position),
        )?;
        let session_type = Self::parse_optional_enum::<SessionType>(
            row,
            CanonicalField::SessionType,
            cell(CanonicalField::SessionType),
        )?;

        let measurement =
            |field: CanonicalField| Self::parse_measurement(row, field, required(field));
        let optional_measurement = |field: CanonicalField| match cell(field) {
            Some(value) if !value.is_empty() => Self::parse_measurement(row, field, value).map(Some),
            _ => Ok(None),
        };

        Ok(SessionRecord {
            date,
            athlete_id: athlete_id.to_string(),
            position,
            session_type,
            duration_minutes: optional_measurement(CanonicalField::DurationMinutes)?,
            total_distance_m: measurement(CanonicalField::TotalDistance)?,
            hsr_distance_m: measurement(CanonicalField::HsrDistance)?,
            sprint_distance_m: measurement(CanonicalField::SprintDistance)?,
            accel_count: Self::parse_count(
                row,
                CanonicalField::Accelerations,
                required(CanonicalField::Accelerations),
            )?,
            decel_count: Self::parse_count(
                row,
                CanonicalField::Decelerations,
                required(CanonicalField::Decelerations),
            )?,
            player_load: measurement(CanonicalField::PlayerLoad)?,
            max_speed_kmh: optional_measurement(CanonicalField::MaxSpeed)?,
        })
    }

    /// Parse a session date; datetimes are truncated to the calendar day
    pub fn parse_date(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                    .map(|dt| dt.date())
            })
    }

    /// Parse a non-negative decimal measurement
    pub fn parse_measurement(
        row: usize,
        field: CanonicalField,
        value: &str,
    ) -> Result<Decimal, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidNumber {
            row,
            column: field.header().to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if value.is_empty() {
            return Err(invalid("empty cell"));
        }

        let parsed = Decimal::from_str(value)
            .or_else(|_| Decimal::from_scientific(value))
            .map_err(|_| invalid("not a number"))?;

        if parsed.is_sign_negative() && !parsed.is_zero() {
            return Err(invalid("negative value"));
        }

        Ok(parsed)
    }

    /// Parse a non-negative whole-number effort count ("12" and "12.0" both accepted)
    pub fn parse_count(row: usize, field: CanonicalField, value: &str) -> Result<u32, ValidationError> {
        let parsed = Self::parse_measurement(row, field, value)?;

        if !parsed.fract().is_zero() {
            return Err(ValidationError::InvalidNumber {
                row,
                column: field.header().to_string(),
                value: value.to_string(),
                reason: "count must be a whole number".to_string(),
            });
        }

        parsed.to_u32().ok_or_else(|| ValidationError::InvalidNumber {
            row,
            column: field.header().to_string(),
            value: value.to_string(),
            reason: "count out of range".to_string(),
        })
    }

    fn parse_optional_enum<T>(
        row: usize,
        field: CanonicalField,
        value: Option<&str>,
    ) -> Result<Option<T>, ValidationError>
    where
        T: FromStr<Err = String>,
    {
        match value {
            Some(value) if !value.is_empty() => {
                value
                    .parse::<T>()
                    .map(Some)
                    .map_err(|reason| ValidationError::InvalidValue {
                        row,
                        column: field.header().to_string(),
                        reason,
                    })
            }
            _ => Ok(None),
        }
    }
}
