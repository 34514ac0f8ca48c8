//! Vendor export handling: header normalization, equivalence across vendors
//! and fail-fast validation of bad cells

use rust_decimal_macros::dec;
use squadload::error::{ImportError, SquadLoadError, ValidationError};
use squadload::import::{CsvImporter, DetectedSchema, ImportOptions, Vendor};
use squadload::{Position, SessionType};
use std::io::Write;

const STATSPORTS: &str = "\
Date,Player Name,Position,Session Type,Duration (min),Total Distance,High Speed Running,Sprint Distance,Accels,Decels,Dynamic Stress Load,Max Speed (km/h)
04/03/2024,Player 1,MID,Training,92,6812,1240,305,63,58,661.2,29.4
06/03/2024,Player 1,MID,Match,117,9305,1788,442,84,79,905.0,31.2
06/03/2024,Player 2,GK,Match,118,4020,310,45,31,29,402.5,24.8
";

const CATAPULT: &str = "\
Date,Athlete Name,Position,Session Type,Duration (min),Total Distance (m),Velocity Band 5 Total Distance,Velocity Band 6 Total Distance,Acceleration Band 3 Total Effort Count,Deceleration Band 3 Total Effort Count,Total Player Load,Max Speed (km/h)
2024-03-04 18:30:00,Player 1,Midfielder,Training,92,6812,1240,305,63,58,661.2,29.4
2024-03-06 15:00:00,Player 1,Midfielder,Match,117,9305,1788,442,84,79,905,31.2
2024-03-06 15:00:00,Player 2,Goalkeeper,Match,118,4020,310,45,31,29,402.5,24.8
";

#[test]
fn test_both_vendors_import_to_identical_records() {
    let importer = CsvImporter::new();

    let statsports = importer.import_reader(STATSPORTS.as_bytes(), "statsports").unwrap();
    let catapult = importer.import_reader(CATAPULT.as_bytes(), "catapult").unwrap();

    assert_eq!(statsports.report.schema, DetectedSchema::Vendor(Vendor::StatSports));
    assert_eq!(catapult.report.schema, DetectedSchema::Vendor(Vendor::Catapult));
    assert_eq!(statsports.records, catapult.records);

    let goalkeeper = &catapult.records[2];
    assert_eq!(goalkeeper.position, Some(Position::Goalkeeper));
    assert_eq!(goalkeeper.session_type, Some(SessionType::Match));
    assert_eq!(goalkeeper.player_load, dec!(402.5));
    assert_eq!(goalkeeper.max_speed_kmh, Some(dec!(24.8)));
}

#[test]
fn test_vendor_files_from_disk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("catapult_export.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(CATAPULT.as_bytes())
        .unwrap();

    let outcome = CsvImporter::new().import_file(&path).unwrap();
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.report.renamed.len(), 6);
}

#[test]
fn test_restricting_vendors_disables_other_mappings() {
    let importer = CsvImporter::with_options(ImportOptions {
        strict_headers: false,
        vendors: Some(vec![Vendor::Catapult]),
    });

    let err = importer
        .import_reader(STATSPORTS.as_bytes(), "statsports")
        .unwrap_err();
    assert!(matches!(
        err,
        SquadLoadError::Import(ImportError::MissingColumn { .. })
    ));
}

#[test]
fn test_non_numeric_cell_names_row_and_column() {
    let csv = STATSPORTS.replace("1788", "abc");

    let err = CsvImporter::new()
        .import_reader(csv.as_bytes(), "bad")
        .unwrap_err();

    match err {
        SquadLoadError::Validation(ValidationError::InvalidNumber {
            row,
            column,
            value,
            ..
        }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "HSR Distance (m)");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_bad_date_is_rejected() {
    let csv = STATSPORTS.replace("04/03/2024", "March 4th");

    let err = CsvImporter::new()
        .import_reader(csv.as_bytes(), "bad-date")
        .unwrap_err();
    assert!(matches!(
        err,
        SquadLoadError::Validation(ValidationError::InvalidDate { row: 1, .. })
    ));
    assert!(err.user_message().contains("March 4th") || err.to_string().contains("March 4th"));
}

#[test]
fn test_duplicate_canonical_column() {
    let csv = "\
Date,Player,Player Name,Total Distance (m),HSR Distance (m),Sprint Distance (m),Accelerations,Decelerations,Player Load (AU)
2024-03-04,A,A,6500,1200,300,60,55,650
";
    let err = CsvImporter::new()
        .import_reader(csv.as_bytes(), "dup")
        .unwrap_err();
    assert!(matches!(
        err,
        SquadLoadError::Import(ImportError::DuplicateColumn { ref column }) if column == "Player"
    ));
}
