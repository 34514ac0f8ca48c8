//! Squad-level views over imported sessions: the latest-session overview,
//! ACWR status counts, player comparison and individual profiles.

use crate::acwr::{AcwrResult, AcwrStatus};
use crate::benchmarks::BenchmarkSet;
use crate::export::DateRange;
use crate::models::{MetricKey, Position, SessionRecord, SessionType, Zone};
use crate::weekly::{IsoWeekKey, WorkloadAggregator};
use crate::zones::ZoneClassifier;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Metrics shown on the team overview
pub const OVERVIEW_METRICS: [MetricKey; 5] = [
    MetricKey::TotalDistance,
    MetricKey::HsrDistance,
    MetricKey::SprintDistance,
    MetricKey::AccelCount,
    MetricKey::PlayerLoad,
];

fn mean(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values.fold((Decimal::ZERO, 0u64), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / Decimal::from(count))
}

/// Restricts records by date range, athlete, position and session type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub date_range: Option<DateRange>,
    pub athlete: Option<String>,
    pub position: Option<Position>,
    pub session_type: Option<SessionType>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn athlete(mut self, athlete: impl Into<String>) -> Self {
        self.athlete = Some(athlete.into());
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = Some(session_type);
        self
    }

    pub fn matches(&self, record: &SessionRecord) -> bool {
        self.date_range
            .as_ref()
            .map_or(true, |range| range.contains(&record.date))
            && self
                .athlete
                .as_ref()
                .map_or(true, |athlete| &record.athlete_id == athlete)
            && self
                .position
                .map_or(true, |position| record.position == Some(position))
            && self
                .session_type
                .map_or(true, |session_type| record.session_type == Some(session_type))
    }

    pub fn apply(&self, records: &[SessionRecord]) -> Vec<SessionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Squad average for one metric on the overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetric {
    pub metric: MetricKey,
    pub average: Decimal,
    pub zone: Zone,
    pub percent_vs_target: Option<Decimal>,
}

/// Squad averages for the most recent session date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOverview {
    pub date: NaiveDate,
    pub athletes: usize,
    pub metrics: Vec<OverviewMetric>,
    pub peak_max_speed: Option<Decimal>,
}

impl TeamOverview {
    /// None when there are no records
    pub fn from_records(records: &[SessionRecord], benchmarks: &BenchmarkSet) -> Option<Self> {
        let date = records.iter().map(|r| r.date).max()?;
        let latest: Vec<&SessionRecord> = records.iter().filter(|r| r.date == date).collect();
        let classifier = ZoneClassifier::new(*benchmarks);

        let metrics = OVERVIEW_METRICS
            .iter()
            .filter_map(|metric| {
                let average = mean(latest.iter().map(|r| r.metric(*metric)))?;
                Some(OverviewMetric {
                    metric: *metric,
                    average,
                    zone: classifier.classify(average, *metric),
                    percent_vs_target: classifier.percent_vs_target(average, *metric),
                })
            })
            .collect();

        let athletes = latest
            .iter()
            .map(|r| r.athlete_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        Some(TeamOverview {
            date,
            athletes,
            metrics,
            peak_max_speed: latest.iter().filter_map(|r| r.max_speed_kmh).max(),
        })
    }

    pub fn metric(&self, metric: MetricKey) -> Option<&OverviewMetric> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Counts of athletes per ACWR status group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadAcwrSummary {
    pub optimal: usize,
    /// Undertraining or High Load
    pub caution: usize,
    /// Detraining Risk or Injury Risk
    pub risk: usize,
    pub no_data: usize,
    /// Mean over athletes that have a ratio
    pub mean_ratio: Option<Decimal>,
}

impl SquadAcwrSummary {
    pub fn from_results(results: &[AcwrResult]) -> Self {
        let mut summary = SquadAcwrSummary::default();
        for result in results {
            match result.status {
                AcwrStatus::Optimal => summary.optimal += 1,
                AcwrStatus::Undertraining | AcwrStatus::HighLoad => summary.caution += 1,
                AcwrStatus::DetrainingRisk | AcwrStatus::InjuryRisk => summary.risk += 1,
                AcwrStatus::NoData => summary.no_data += 1,
            }
        }
        summary.mean_ratio = mean(results.iter().filter_map(|r| r.ratio));
        summary
    }
}

/// One athlete's row in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub athlete_id: String,
    pub means: BTreeMap<MetricKey, Decimal>,
    /// Each mean as a percentage of the highest mean among the compared athletes
    pub normalized: BTreeMap<MetricKey, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerComparison {
    pub rows: Vec<ComparisonRow>,
}

impl PlayerComparison {
    /// Compare athletes in the given order. Athletes without records are skipped.
    pub fn build(records: &[SessionRecord], athletes: &[String]) -> Self {
        let mut rows: Vec<ComparisonRow> = athletes
            .iter()
            .filter_map(|athlete| {
                let sessions: Vec<&SessionRecord> =
                    records.iter().filter(|r| &r.athlete_id == athlete).collect();
                if sessions.is_empty() {
                    warn!(athlete = %athlete, "No sessions to compare");
                    return None;
                }

                let means = MetricKey::ALL
                    .iter()
                    .filter_map(|metric| {
                        mean(sessions.iter().map(|r| r.metric(*metric))).map(|m| (*metric, m))
                    })
                    .collect();

                Some(ComparisonRow {
                    athlete_id: athlete.clone(),
                    means,
                    normalized: BTreeMap::new(),
                })
            })
            .collect();

        for metric in MetricKey::ALL {
            let max = rows
                .iter()
                .filter_map(|row| row.means.get(&metric).copied())
                .max()
                .unwrap_or(Decimal::ZERO);

            for row in &mut rows {
                let value = row.means.get(&metric).copied().unwrap_or(Decimal::ZERO);
                let pct = if max.is_zero() {
                    Decimal::ZERO
                } else {
                    value / max * dec!(100)
                };
                row.normalized.insert(metric, pct);
            }
        }

        PlayerComparison { rows }
    }
}

/// Individual athlete profile with a per-session load trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub athlete_id: String,
    /// Position recorded on the athlete's earliest session
    pub position: Option<Position>,
    pub sessions: usize,
    pub average_load: Decimal,
    /// (date, total distance, player load), oldest first
    pub trend: Vec<(NaiveDate, Decimal, Decimal)>,
}

impl PlayerProfile {
    pub fn build(records: &[SessionRecord], athlete: &str) -> Option<Self> {
        let mut sessions: Vec<&SessionRecord> =
            records.iter().filter(|r| r.athlete_id == athlete).collect();
        sessions.sort_by_key(|r| r.date);

        let average_load = mean(sessions.iter().map(|r| r.player_load))?;

        Some(PlayerProfile {
            athlete_id: athlete.to_string(),
            position: sessions.first().and_then(|r| r.position),
            sessions: sessions.len(),
            average_load,
            trend: sessions
                .iter()
                .map(|r| (r.date, r.total_distance_m, r.player_load))
                .collect(),
        })
    }
}

/// Squad weekly totals for one metric with a target 10% above the mean week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProgression {
    pub metric: MetricKey,
    pub weeks: Vec<(IsoWeekKey, Decimal)>,
    pub target: Decimal,
}

impl LoadProgression {
    pub fn from_records(records: &[SessionRecord], metric: MetricKey) -> Self {
        let weeks: Vec<(IsoWeekKey, Decimal)> = WorkloadAggregator::team_weekly_totals(records)
            .into_iter()
            .map(|(week, totals)| (week, totals.get(metric)))
            .collect();
        let target = mean(weeks.iter().map(|(_, v)| *v)).unwrap_or(Decimal::ZERO) * dec!(1.1);

        LoadProgression {
            metric,
            weeks,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::FIELD_HOCKEY_V1;

    fn record(athlete: &str, day: u32, distance: Decimal, load: Decimal) -> SessionRecord {
        SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            athlete_id: athlete.to_string(),
            position: Some(Position::Midfielder),
            session_type: Some(SessionType::Training),
            duration_minutes: Some(dec!(90)),
            total_distance_m: distance,
            hsr_distance_m: dec!(1200),
            sprint_distance_m: dec!(300),
            accel_count: 60,
            decel_count: 55,
            player_load: load,
            max_speed_kmh: Some(dec!(28) + Decimal::from(day)),
        }
    }

    fn result(athlete: &str, ratio: Option<Decimal>, status: AcwrStatus) -> AcwrResult {
        AcwrResult {
            athlete_id: athlete.to_string(),
            ratio,
            zone: status.zone(),
            status,
        }
    }

    #[test]
    fn test_overview_uses_latest_date_only() {
        let records = vec![
            record("A", 4, dec!(9000), dec!(700)),
            record("A", 6, dec!(6000), dec!(600)),
            record("B", 6, dec!(7000), dec!(700)),
        ];

        let overview = TeamOverview::from_records(&records, &FIELD_HOCKEY_V1).unwrap();

        assert_eq!(overview.date, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(overview.athletes, 2);
        let distance = overview.metric(MetricKey::TotalDistance).unwrap();
        assert_eq!(distance.average, dec!(6500));
        assert_eq!(distance.zone, Zone::Green);
        // 6500 vs a 6650 m training target
        assert!(distance.percent_vs_target.unwrap() < Decimal::ZERO);
        assert_eq!(overview.peak_max_speed, Some(dec!(34)));
        assert!(overview.metric(MetricKey::DecelCount).is_none());
    }

    #[test]
    fn test_overview_empty() {
        assert!(TeamOverview::from_records(&[], &FIELD_HOCKEY_V1).is_none());
    }

    #[test]
    fn test_acwr_summary_counts() {
        let results = vec![
            result("A", Some(dec!(1.0)), AcwrStatus::Optimal),
            result("B", Some(dec!(1.4)), AcwrStatus::HighLoad),
            result("C", Some(dec!(0.7)), AcwrStatus::Undertraining),
            result("D", Some(dec!(1.6)), AcwrStatus::InjuryRisk),
            result("E", None, AcwrStatus::NoData),
        ];

        let summary = SquadAcwrSummary::from_results(&results);
        assert_eq!(summary.optimal, 1);
        assert_eq!(summary.caution, 2);
        assert_eq!(summary.risk, 1);
        assert_eq!(summary.no_data, 1);
        assert_eq!(summary.mean_ratio, Some(dec!(1.175)));
    }

    #[test]
    fn test_comparison_normalizes_to_max() {
        let records = vec![
            record("A", 4, dec!(8000), dec!(800)),
            record("A", 6, dec!(6000), dec!(600)),
            record("B", 4, dec!(3500), dec!(350)),
        ];
        let athletes = vec!["A".to_string(), "B".to_string(), "Ghost".to_string()];

        let comparison = PlayerComparison::build(&records, &athletes);

        assert_eq!(comparison.rows.len(), 2);
        let a = &comparison.rows[0];
        let b = &comparison.rows[1];
        assert_eq!(a.means[&MetricKey::TotalDistance], dec!(7000));
        assert_eq!(a.normalized[&MetricKey::TotalDistance], dec!(100));
        assert_eq!(b.normalized[&MetricKey::TotalDistance], dec!(50));
        // Equal means both normalize to 100
        assert_eq!(b.normalized[&MetricKey::AccelCount], dec!(100));
    }

    #[test]
    fn test_comparison_zero_max_stays_zero() {
        let mut zero = record("A", 4, dec!(0), dec!(0));
        zero.sprint_distance_m = Decimal::ZERO;
        let comparison = PlayerComparison::build(&[zero], &["A".to_string()]);
        assert_eq!(comparison.rows[0].normalized[&MetricKey::PlayerLoad], Decimal::ZERO);
        assert_eq!(comparison.rows[0].normalized[&MetricKey::SprintDistance], Decimal::ZERO);
    }

    #[test]
    fn test_record_filter() {
        let mut gk_match = record("B", 6, dec!(4000), dec!(400));
        gk_match.position = Some(Position::Goalkeeper);
        gk_match.session_type = Some(SessionType::Match);
        let records = vec![
            record("A", 4, dec!(8000), dec!(800)),
            record("A", 8, dec!(6000), dec!(600)),
            gk_match,
        ];

        let start = NaiveDate::from_ymd_opt(2024, 3, 5);
        let end = NaiveDate::from_ymd_opt(2024, 3, 8);
        assert_eq!(RecordFilter::new().between(start, end).apply(&records).len(), 2);
        assert_eq!(RecordFilter::new().athlete("A").apply(&records).len(), 2);
        assert_eq!(
            RecordFilter::new()
                .position(Position::Goalkeeper)
                .session_type(SessionType::Match)
                .apply(&records)
                .len(),
            1
        );
        assert_eq!(RecordFilter::new().apply(&records).len(), 3);
        assert!(RecordFilter::new()
            .athlete("A")
            .session_type(SessionType::Match)
            .apply(&records)
            .is_empty());
    }

    #[test]
    fn test_player_profile() {
        let records = vec![
            record("A", 8, dec!(6000), dec!(600)),
            record("A", 4, dec!(8000), dec!(800)),
            record("B", 4, dec!(3500), dec!(350)),
        ];

        let profile = PlayerProfile::build(&records, "A").unwrap();
        assert_eq!(profile.sessions, 2);
        assert_eq!(profile.average_load, dec!(700));
        assert_eq!(profile.position, Some(Position::Midfielder));
        assert_eq!(profile.trend[0].1, dec!(8000));
        assert!(PlayerProfile::build(&records, "Nobody").is_none());
    }

    #[test]
    fn test_load_progression_target() {
        let records = vec![
            record("A", 4, dec!(8000), dec!(800)),
            record("B", 5, dec!(3500), dec!(400)),
            record("A", 11, dec!(6000), dec!(600)),
        ];

        let progression = LoadProgression::from_records(&records, MetricKey::PlayerLoad);
        assert_eq!(progression.weeks.len(), 2);
        assert_eq!(progression.weeks[0].1, dec!(1200));
        assert_eq!(progression.target, dec!(990));
    }
}
