use crate::models::{MetricKey, SessionRecord};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// ISO calendar week. Ordering is chronological because the ISO year comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsoWeekKey {
    pub year: i32,
    pub week: u32,
}

impl IsoWeekKey {
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        IsoWeekKey {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Monday of this week
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, chrono::Weekday::Mon)
    }
}

impl fmt::Display for IsoWeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Summed flow metrics for a group of sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotals {
    pub total_distance_m: Decimal,
    pub hsr_distance_m: Decimal,
    pub sprint_distance_m: Decimal,
    pub accel_count: Decimal,
    pub decel_count: Decimal,
    pub player_load: Decimal,
    pub session_count: u32,
}

impl WeeklyTotals {
    /// Add one session's additive metrics
    pub fn add(&mut self, record: &SessionRecord) {
        self.total_distance_m += record.total_distance_m;
        self.hsr_distance_m += record.hsr_distance_m;
        self.sprint_distance_m += record.sprint_distance_m;
        self.accel_count += Decimal::from(record.accel_count);
        self.decel_count += Decimal::from(record.decel_count);
        self.player_load += record.player_load;
        self.session_count += 1;
    }

    pub fn get(&self, metric: MetricKey) -> Decimal {
        match metric {
            MetricKey::TotalDistance => self.total_distance_m,
            MetricKey::HsrDistance => self.hsr_distance_m,
            MetricKey::SprintDistance => self.sprint_distance_m,
            MetricKey::AccelCount => self.accel_count,
            MetricKey::DecelCount => self.decel_count,
            MetricKey::PlayerLoad => self.player_load,
        }
    }
}

/// One athlete's summed load for one ISO week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    pub athlete_id: String,
    pub week: IsoWeekKey,
    pub totals: WeeklyTotals,
}

impl WeeklyAggregate {
    pub fn metric(&self, metric: MetricKey) -> Decimal {
        self.totals.get(metric)
    }
}

/// Groups session records into per-athlete weekly sums
pub struct WorkloadAggregator;

impl WorkloadAggregator {
    /// One aggregate per (athlete, week), ordered by athlete then ascending week.
    /// Weeks without sessions are not filled in.
    pub fn aggregate(records: &[SessionRecord]) -> Vec<WeeklyAggregate> {
        let mut groups: BTreeMap<(&str, IsoWeekKey), WeeklyTotals> = BTreeMap::new();

        for record in records {
            groups
                .entry((record.athlete_id.as_str(), IsoWeekKey::from_date(record.date)))
                .or_default()
                .add(record);
        }

        debug!(
            records = records.len(),
            aggregates = groups.len(),
            "Aggregated sessions into athlete weeks"
        );

        groups
            .into_iter()
            .map(|((athlete_id, week), totals)| WeeklyAggregate {
                athlete_id: athlete_id.to_string(),
                week,
                totals,
            })
            .collect()
    }

    /// Chronological series of one metric for every athlete
    pub fn weekly_series(
        aggregates: &[WeeklyAggregate],
        metric: MetricKey,
    ) -> BTreeMap<String, Vec<Decimal>> {
        let mut by_athlete: BTreeMap<String, Vec<(IsoWeekKey, Decimal)>> = BTreeMap::new();

        for aggregate in aggregates {
            by_athlete
                .entry(aggregate.athlete_id.clone())
                .or_default()
                .push((aggregate.week, aggregate.metric(metric)));
        }

        by_athlete
            .into_iter()
            .map(|(athlete, mut weeks)| {
                weeks.sort_by_key(|(week, _)| *week);
                (athlete, weeks.into_iter().map(|(_, value)| value).collect())
            })
            .collect()
    }

    /// Squad-wide totals per ISO week
    pub fn team_weekly_totals(records: &[SessionRecord]) -> BTreeMap<IsoWeekKey, WeeklyTotals> {
        let mut weeks: BTreeMap<IsoWeekKey, WeeklyTotals> = BTreeMap::new();
        for record in records {
            weeks
                .entry(IsoWeekKey::from_date(record.date))
                .or_default()
                .add(record);
        }
        weeks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Position, SessionType};
    use rust_decimal_macros::dec;

    fn record(athlete: &str, date: NaiveDate, load: Decimal) -> SessionRecord {
        SessionRecord {
            date,
            athlete_id: athlete.to_string(),
            position: Some(Position::Midfielder),
            session_type: Some(SessionType::Training),
            duration_minutes: Some(dec!(90)),
            total_distance_m: dec!(6500),
            hsr_distance_m: dec!(1200),
            sprint_distance_m: dec!(300),
            accel_count: 60,
            decel_count: 55,
            player_load: load,
            max_speed_kmh: Some(dec!(28.5)),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_week_sums() {
        // Monday and Sunday of ISO week 2024-W10
        let records = vec![
            record("Player 1", day(2024, 3, 4), dec!(650.5)),
            record("Player 1", day(2024, 3, 10), dec!(700)),
        ];

        let aggregates = WorkloadAggregator::aggregate(&records);

        assert_eq!(aggregates.len(), 1);
        let week = &aggregates[0];
        assert_eq!(week.week.to_string(), "2024-W10");
        assert_eq!(week.totals.player_load, dec!(1350.5));
        assert_eq!(week.totals.total_distance_m, dec!(13000));
        assert_eq!(week.totals.accel_count, dec!(120));
        assert_eq!(week.totals.decel_count, dec!(110));
        assert_eq!(week.totals.session_count, 2);
    }

    #[test]
    fn test_ordering_by_athlete_then_week() {
        let records = vec![
            record("B", day(2024, 3, 18), dec!(3)),
            record("A", day(2024, 3, 18), dec!(2)),
            record("A", day(2024, 3, 4), dec!(1)),
            record("B", day(2024, 3, 4), dec!(4)),
        ];

        let aggregates = WorkloadAggregator::aggregate(&records);
        let order: Vec<(String, String)> = aggregates
            .iter()
            .map(|a| (a.athlete_id.clone(), a.week.to_string()))
            .collect();

        assert_eq!(
            order,
            vec![
                ("A".to_string(), "2024-W10".to_string()),
                ("A".to_string(), "2024-W12".to_string()),
                ("B".to_string(), "2024-W10".to_string()),
                ("B".to_string(), "2024-W12".to_string()),
            ]
        );
    }

    #[test]
    fn test_new_year_boundary_is_chronological() {
        // 2024-12-30 belongs to ISO week 2025-W01; 2024-12-23 to 2024-W52
        let records = vec![
            record("A", day(2025, 1, 8), dec!(30)),
            record("A", day(2024, 12, 30), dec!(20)),
            record("A", day(2024, 12, 23), dec!(10)),
        ];

        let aggregates = WorkloadAggregator::aggregate(&records);
        let weeks: Vec<String> = aggregates.iter().map(|a| a.week.to_string()).collect();
        assert_eq!(weeks, vec!["2024-W52", "2025-W01", "2025-W02"]);

        let series = WorkloadAggregator::weekly_series(&aggregates, MetricKey::PlayerLoad);
        assert_eq!(series["A"], vec![dec!(10), dec!(20), dec!(30)]);
    }

    #[test]
    fn test_team_weekly_totals() {
        let records = vec![
            record("A", day(2024, 3, 4), dec!(100)),
            record("B", day(2024, 3, 5), dec!(200)),
            record("A", day(2024, 3, 12), dec!(50)),
        ];

        let team = WorkloadAggregator::team_weekly_totals(&records);
        assert_eq!(team.len(), 2);
        let first = team.values().next().unwrap();
        assert_eq!(first.player_load, dec!(300));
        assert_eq!(first.session_count, 2);
    }

    #[test]
    fn test_week_start_date() {
        let key = IsoWeekKey::from_date(day(2024, 3, 7));
        assert_eq!(key.start_date(), Some(day(2024, 3, 4)));
    }
}
