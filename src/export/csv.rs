use super::ExportError;
use crate::acwr::AcwrResult;
use crate::models::{CanonicalField, MetricKey, SessionRecord};
use crate::weekly::WeeklyAggregate;
use csv::Writer;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write session records as canonical CSV, newest first.
///
/// Only the given columns are written, in the given order. Records on the
/// same date keep their input order. Returns the number of rows written.
pub fn export_records<W: Write>(
    records: &[SessionRecord],
    columns: &[CanonicalField],
    writer: W,
) -> Result<usize, ExportError> {
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let mut sorted: Vec<&SessionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut csv = Writer::from_writer(writer);
    csv.write_record(columns.iter().map(|c| c.header()))?;
    for record in &sorted {
        csv.write_record(columns.iter().map(|c| record.field_value(*c)))?;
    }
    csv.flush()?;

    Ok(sorted.len())
}

/// Export records to a file on disk
pub fn export_records_to_path<P: AsRef<Path>>(
    records: &[SessionRecord],
    columns: &[CanonicalField],
    output_path: P,
) -> Result<usize, ExportError> {
    let file = std::fs::File::create(output_path.as_ref())?;
    let rows = export_records(records, columns, file)?;

    info!(
        file = %output_path.as_ref().display(),
        rows,
        columns = columns.len(),
        "Exported session records"
    );
    Ok(rows)
}

/// Export weekly aggregates, one row per athlete week
pub fn export_weekly<W: Write>(
    aggregates: &[WeeklyAggregate],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = Writer::from_writer(writer);

    let mut header = vec!["Player", "Week", "Sessions"];
    header.extend(MetricKey::ALL.iter().map(|m| m.field().header()));
    csv.write_record(&header)?;

    for aggregate in aggregates {
        let mut row = vec![
            aggregate.athlete_id.clone(),
            aggregate.week.to_string(),
            aggregate.totals.session_count.to_string(),
        ];
        row.extend(MetricKey::ALL.iter().map(|m| aggregate.metric(*m).to_string()));
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Export squad ACWR results; ratios are rounded to 3 dp and blank when missing
pub fn export_acwr<W: Write>(results: &[AcwrResult], writer: W) -> Result<(), ExportError> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(["Player", "ACWR", "Zone", "Status"])?;

    for result in results {
        csv.write_record([
            result.athlete_id.clone(),
            result
                .ratio
                .map_or(String::new(), |r| r.round_dp(3).to_string()),
            result.zone.to_string(),
            result.status.to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acwr::AcwrStatus;
    use crate::models::{Position, SessionType, Zone};
    use crate::weekly::WorkloadAggregator;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    fn record(athlete: &str, day: u32) -> SessionRecord {
        SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            athlete_id: athlete.to_string(),
            position: Some(Position::Defender),
            session_type: Some(SessionType::Training),
            duration_minutes: None,
            total_distance_m: dec!(6400),
            hsr_distance_m: dec!(1100),
            sprint_distance_m: dec!(280),
            accel_count: 58,
            decel_count: 52,
            player_load: dec!(612.4),
            max_speed_kmh: None,
        }
    }

    fn export_to_string(records: &[SessionRecord], columns: &[CanonicalField]) -> String {
        let mut buffer = Vec::new();
        export_records(records, columns, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_records_sorted_newest_first_with_stable_ties() {
        let records = vec![
            record("Early", 4),
            record("Late B", 8),
            record("Mid", 6),
            record("Late A", 8),
        ];

        let output = export_to_string(&records, &[CanonicalField::Player, CanonicalField::Date]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Player,Date",
                "Late B,2024-03-08",
                "Late A,2024-03-08",
                "Mid,2024-03-06",
                "Early,2024-03-04",
            ]
        );
    }

    #[test]
    fn test_missing_optional_fields_are_blank() {
        let output = export_to_string(
            &[record("A", 4)],
            &[
                CanonicalField::Player,
                CanonicalField::DurationMinutes,
                CanonicalField::PlayerLoad,
                CanonicalField::MaxSpeed,
            ],
        );

        assert_eq!(
            output,
            "Player,Duration (min),Player Load (AU),Max Speed (km/h)\nA,,612.4,\n"
        );
    }

    #[test]
    fn test_no_columns_rejected() {
        let mut buffer = Vec::new();
        assert!(matches!(
            export_records(&[record("A", 4)], &[], &mut buffer),
            Err(ExportError::NoColumns)
        ));
    }

    #[test]
    fn test_export_to_path() {
        let temp_file = NamedTempFile::new().unwrap();
        let rows =
            export_records_to_path(&[record("A", 4)], &CanonicalField::ALL, temp_file.path())
                .unwrap();
        assert_eq!(rows, 1);

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("Date,Player,Position,Session Type,Duration (min)"));
        assert!(content.contains("2024-03-04,A,DEF,Training,,6400,1100,280,58,52,612.4,"));
    }

    #[test]
    fn test_export_weekly() {
        let aggregates = WorkloadAggregator::aggregate(&[record("A", 4), record("A", 6)]);
        let mut buffer = Vec::new();
        export_weekly(&aggregates, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "Player,Week,Sessions,Total Distance (m),HSR Distance (m),Sprint Distance (m),Accelerations,Decelerations,Player Load (AU)"
        );
        assert_eq!(lines[1], "A,2024-W10,2,12800,2200,560,116,104,1224.8");
    }

    #[test]
    fn test_export_acwr() {
        let results = vec![
            AcwrResult {
                athlete_id: "A".to_string(),
                ratio: Some(dec!(1.00562)),
                zone: Zone::Green,
                status: AcwrStatus::Optimal,
            },
            AcwrResult {
                athlete_id: "B".to_string(),
                ratio: None,
                zone: Zone::Gray,
                status: AcwrStatus::NoData,
            },
        ];

        let mut buffer = Vec::new();
        export_acwr(&results, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(
            output,
            "Player,ACWR,Zone,Status\nA,1.006,green,Optimal\nB,,gray,No data\n"
        );
    }
}
