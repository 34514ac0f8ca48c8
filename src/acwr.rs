//! Acute:Chronic Workload Ratio
//!
//! The chronic load is an exponentially weighted moving average over weekly
//! sums; the acute load is the latest week as recorded.

use crate::error::CalculationError;
use crate::models::{MetricKey, Zone};
use crate::weekly::{WeeklyAggregate, WorkloadAggregator};
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Ratio boundaries for the ACWR status bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcwrThresholds {
    /// Below this the athlete is at detraining risk
    pub detraining_below: Decimal,
    /// Lower edge of the optimal band (inclusive)
    pub optimal_low: Decimal,
    /// Upper edge of the optimal band (inclusive)
    pub optimal_high: Decimal,
    /// Above this the athlete is at injury risk
    pub injury_above: Decimal,
}

impl Default for AcwrThresholds {
    fn default() -> Self {
        AcwrThresholds {
            detraining_below: dec!(0.6),
            optimal_low: dec!(0.8),
            optimal_high: dec!(1.3),
            injury_above: dec!(1.5),
        }
    }
}

/// ACWR windows, load metric and status thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcwrConfig {
    /// Acute window in weeks (default: 1). Validated against the chronic
    /// window; the acute load itself is always the latest week.
    pub acute_weeks: usize,

    /// Weeks in the chronic window; also the minimum history (default: 4)
    pub chronic_weeks: usize,

    /// Weekly metric the ratio is computed over
    pub load_metric: MetricKey,

    pub thresholds: AcwrThresholds,
}

impl Default for AcwrConfig {
    fn default() -> Self {
        AcwrConfig {
            acute_weeks: 1,
            chronic_weeks: 4,
            load_metric: MetricKey::PlayerLoad,
            thresholds: AcwrThresholds::default(),
        }
    }
}

impl AcwrConfig {
    pub fn validate(&self) -> Result<(), CalculationError> {
        let invalid = |parameter: &str, value: String| CalculationError::InvalidParameter {
            calculation: "ACWR".to_string(),
            parameter: parameter.to_string(),
            value,
        };

        if self.chronic_weeks == 0 {
            return Err(invalid("chronic_weeks", "0".to_string()));
        }
        if self.acute_weeks == 0 {
            return Err(invalid("acute_weeks", "0".to_string()));
        }
        if self.acute_weeks > self.chronic_weeks {
            return Err(invalid(
                "acute_weeks",
                format!("{} (exceeds chronic_weeks {})", self.acute_weeks, self.chronic_weeks),
            ));
        }

        let t = &self.thresholds;
        if !(t.detraining_below < t.optimal_low
            && t.optimal_low < t.optimal_high
            && t.optimal_high < t.injury_above)
        {
            return Err(invalid(
                "thresholds",
                format!(
                    "{}/{}/{}/{} (must be strictly ascending)",
                    t.detraining_below, t.optimal_low, t.optimal_high, t.injury_above
                ),
            ));
        }

        Ok(())
    }
}

/// Result of one ratio computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcwrOutcome {
    Ratio(Decimal),
    /// History shorter than the chronic window, or a zero chronic load
    InsufficientData,
}

impl AcwrOutcome {
    pub fn ratio(&self) -> Option<Decimal> {
        match self {
            AcwrOutcome::Ratio(r) => Some(*r),
            AcwrOutcome::InsufficientData => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcwrStatus {
    Optimal,
    Undertraining,
    #[serde(rename = "High Load")]
    HighLoad,
    #[serde(rename = "Detraining Risk")]
    DetrainingRisk,
    #[serde(rename = "Injury Risk")]
    InjuryRisk,
    #[serde(rename = "No data")]
    NoData,
}

impl AcwrStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AcwrStatus::Optimal => "Optimal",
            AcwrStatus::Undertraining => "Undertraining",
            AcwrStatus::HighLoad => "High Load",
            AcwrStatus::DetrainingRisk => "Detraining Risk",
            AcwrStatus::InjuryRisk => "Injury Risk",
            AcwrStatus::NoData => "No data",
        }
    }

    pub fn zone(&self) -> Zone {
        match self {
            AcwrStatus::Optimal => Zone::Green,
            AcwrStatus::Undertraining | AcwrStatus::HighLoad => Zone::Yellow,
            AcwrStatus::DetrainingRisk | AcwrStatus::InjuryRisk => Zone::Red,
            AcwrStatus::NoData => Zone::Gray,
        }
    }
}

impl fmt::Display for AcwrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ACWR for one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcwrResult {
    pub athlete_id: String,
    /// None when there is not enough history
    pub ratio: Option<Decimal>,
    pub zone: Zone,
    pub status: AcwrStatus,
}

/// ACWR calculation engine
pub struct AcwrCalculator {
    config: AcwrConfig,
}

impl AcwrCalculator {
    /// Create calculator with the default 1:4 week windows over player load
    pub fn new() -> Self {
        AcwrCalculator {
            config: AcwrConfig::default(),
        }
    }

    /// Create calculator with custom configuration
    pub fn with_config(config: AcwrConfig) -> Result<Self, CalculationError> {
        config.validate()?;
        Ok(AcwrCalculator { config })
    }

    pub fn config(&self) -> &AcwrConfig {
        &self.config
    }

    /// Ratio for one chronological series of weekly sums
    pub fn compute_acwr(&self, weekly_loads: &[Decimal]) -> AcwrOutcome {
        compute_acwr(
            weekly_loads,
            self.config.acute_weeks,
            self.config.chronic_weeks,
        )
    }

    /// Map a ratio (or its absence) onto zone and status
    pub fn status_for(&self, ratio: Option<Decimal>) -> AcwrStatus {
        let t = &self.config.thresholds;
        match ratio {
            None => AcwrStatus::NoData,
            Some(r) if r >= t.optimal_low && r <= t.optimal_high => AcwrStatus::Optimal,
            Some(r) if r >= t.detraining_below && r < t.optimal_low => AcwrStatus::Undertraining,
            Some(r) if r > t.optimal_high && r <= t.injury_above => AcwrStatus::HighLoad,
            Some(r) if r < t.detraining_below => AcwrStatus::DetrainingRisk,
            Some(_) => AcwrStatus::InjuryRisk,
        }
    }

    /// Full result for one athlete's series
    pub fn evaluate(&self, athlete_id: &str, weekly_loads: &[Decimal]) -> AcwrResult {
        let ratio = self.compute_acwr(weekly_loads).ratio();
        let status = self.status_for(ratio);
        AcwrResult {
            athlete_id: athlete_id.to_string(),
            ratio,
            zone: status.zone(),
            status,
        }
    }

    /// One result per athlete, sorted by athlete id. Athletes with short
    /// histories are kept with a "No data" result.
    pub fn compute_squad(&self, aggregates: &[WeeklyAggregate]) -> Vec<AcwrResult> {
        let series: Vec<(String, Vec<Decimal>)> =
            WorkloadAggregator::weekly_series(aggregates, self.config.load_metric)
                .into_iter()
                .collect();

        let mut results: Vec<AcwrResult> = series
            .par_iter()
            .map(|(athlete, loads)| self.evaluate(athlete, loads))
            .collect();
        results.sort_by(|a, b| a.athlete_id.cmp(&b.athlete_id));

        debug!(
            athletes = results.len(),
            with_ratio = results.iter().filter(|r| r.ratio.is_some()).count(),
            metric = %self.config.load_metric,
            "Computed squad ACWR"
        );

        results
    }
}

impl Default for AcwrCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// EWMA-based ACWR over weekly sums, oldest first.
///
/// λ = 2 / (chronic_weeks × 7 + 1); the EWMA is seeded with the first week.
/// The acute load is the latest week as recorded. `acute_weeks` must be
/// non-zero but does not otherwise change the result.
pub fn compute_acwr(weekly_loads: &[Decimal], acute_weeks: usize, chronic_weeks: usize) -> AcwrOutcome {
    if chronic_weeks == 0 || acute_weeks == 0 || weekly_loads.len() < chronic_weeks {
        return AcwrOutcome::InsufficientData;
    }

    let acute = weekly_loads[weekly_loads.len() - 1];

    let lambda = Decimal::TWO / Decimal::from((chronic_weeks * 7 + 1) as u64);
    let chronic = weekly_loads[1..]
        .iter()
        .fold(weekly_loads[0], |ewma, load| {
            *load * lambda + ewma * (Decimal::ONE - lambda)
        });

    if chronic.is_zero() {
        return AcwrOutcome::InsufficientData;
    }

    AcwrOutcome::Ratio(acute / chronic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekly::{IsoWeekKey, WeeklyTotals};
    use proptest::prelude::*;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} ≈ {}, tolerance {}",
            actual,
            expected,
            tolerance
        );
    }

    fn aggregate(athlete: &str, week: u32, load: Decimal) -> WeeklyAggregate {
        WeeklyAggregate {
            athlete_id: athlete.to_string(),
            week: IsoWeekKey { year: 2024, week },
            totals: WeeklyTotals {
                player_load: load,
                session_count: 4,
                ..WeeklyTotals::default()
            },
        }
    }

    #[test]
    fn test_worked_example() {
        let loads = [dec!(500), dec!(520), dec!(510), dec!(505)];
        let outcome = compute_acwr(&loads, 1, 4);

        let ratio = outcome.ratio().unwrap();
        // chronic EWMA with λ = 2/29 ends at ≈ 502.1825
        assert_close(ratio, dec!(505) / dec!(502.1825), dec!(0.0001));
        assert_close(ratio, dec!(1.0056), dec!(0.0001));

        let calculator = AcwrCalculator::new();
        let status = calculator.status_for(Some(ratio));
        assert_eq!(status, AcwrStatus::Optimal);
        assert_eq!(status.zone(), Zone::Green);
    }

    #[test]
    fn test_short_history_is_insufficient() {
        let loads = [dec!(500), dec!(520), dec!(510)];
        assert_eq!(compute_acwr(&loads, 1, 4), AcwrOutcome::InsufficientData);
    }

    #[test]
    fn test_zero_chronic_is_insufficient() {
        let loads = [Decimal::ZERO; 4];
        assert_eq!(compute_acwr(&loads, 1, 4), AcwrOutcome::InsufficientData);
    }

    #[test]
    fn test_status_mapping() {
        let calculator = AcwrCalculator::new();

        assert_eq!(calculator.status_for(Some(dec!(1.40))), AcwrStatus::HighLoad);
        assert_eq!(calculator.status_for(Some(dec!(0.55))), AcwrStatus::DetrainingRisk);
        assert_eq!(calculator.status_for(Some(dec!(1.55))), AcwrStatus::InjuryRisk);
        assert_eq!(calculator.status_for(Some(dec!(0.7))), AcwrStatus::Undertraining);
        assert_eq!(calculator.status_for(None), AcwrStatus::NoData);

        assert_eq!(AcwrStatus::HighLoad.zone(), Zone::Yellow);
        assert_eq!(AcwrStatus::InjuryRisk.zone(), Zone::Red);
        assert_eq!(AcwrStatus::NoData.zone(), Zone::Gray);
    }

    #[test]
    fn test_status_boundaries() {
        let calculator = AcwrCalculator::new();

        assert_eq!(calculator.status_for(Some(dec!(0.8))), AcwrStatus::Optimal);
        assert_eq!(calculator.status_for(Some(dec!(1.3))), AcwrStatus::Optimal);
        assert_eq!(calculator.status_for(Some(dec!(0.6))), AcwrStatus::Undertraining);
        assert_eq!(calculator.status_for(Some(dec!(1.5))), AcwrStatus::HighLoad);
        assert_eq!(calculator.status_for(Some(dec!(0.5999))), AcwrStatus::DetrainingRisk);
        assert_eq!(calculator.status_for(Some(dec!(1.5001))), AcwrStatus::InjuryRisk);
    }

    #[test]
    fn test_acute_load_is_latest_week() {
        let loads = [dec!(400), dec!(400), dec!(400), dec!(600), dec!(800)];
        let one = compute_acwr(&loads, 1, 4);
        let two = compute_acwr(&loads, 2, 4);
        assert_eq!(one, two);

        let lambda = dec!(2) / dec!(29);
        let chronic = loads[1..]
            .iter()
            .fold(loads[0], |ewma, load| *load * lambda + ewma * (Decimal::ONE - lambda));
        assert_close(two.ratio().unwrap(), dec!(800) / chronic, dec!(0.0000001));
        assert_close(two.ratio().unwrap(), dec!(1.8164), dec!(0.0001));
    }

    #[test]
    fn test_config_validation() {
        assert!(AcwrConfig::default().validate().is_ok());

        let zero_chronic = AcwrConfig {
            chronic_weeks: 0,
            ..AcwrConfig::default()
        };
        assert!(matches!(
            zero_chronic.validate(),
            Err(CalculationError::InvalidParameter { ref parameter, .. }) if parameter == "chronic_weeks"
        ));

        let acute_too_long = AcwrConfig {
            acute_weeks: 5,
            ..AcwrConfig::default()
        };
        assert!(acute_too_long.validate().is_err());
        assert!(AcwrCalculator::with_config(acute_too_long).is_err());

        let unordered = AcwrConfig {
            thresholds: AcwrThresholds {
                optimal_high: dec!(1.6),
                ..AcwrThresholds::default()
            },
            ..AcwrConfig::default()
        };
        assert!(unordered.validate().is_err());
    }

    #[test]
    fn test_compute_squad_keeps_short_histories() {
        let mut aggregates = Vec::new();
        for (week, load) in [(1, dec!(500)), (2, dec!(520)), (3, dec!(510)), (4, dec!(505))] {
            aggregates.push(aggregate("Player 2", week, load));
        }
        aggregates.push(aggregate("Player 1", 4, dec!(600)));

        let results = AcwrCalculator::new().compute_squad(&aggregates);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].athlete_id, "Player 1");
        assert_eq!(results[0].ratio, None);
        assert_eq!(results[0].zone, Zone::Gray);
        assert_eq!(results[0].status, AcwrStatus::NoData);

        assert_eq!(results[1].athlete_id, "Player 2");
        assert_eq!(results[1].status, AcwrStatus::Optimal);
    }

    #[test]
    fn test_status_serializes_as_label() {
        let json = serde_json::to_string(&AcwrStatus::HighLoad).unwrap();
        assert_eq!(json, "\"High Load\"");
    }

    proptest! {
        #[test]
        fn prop_constant_loads_give_unit_ratio(load in 1u32..5000, weeks in 4usize..16) {
            let loads = vec![Decimal::from(load); weeks];
            let ratio = compute_acwr(&loads, 1, 4).ratio().unwrap();
            prop_assert!((ratio - Decimal::ONE).abs() < dec!(0.000000001));
        }

        #[test]
        fn prop_ratio_present_iff_history_long_enough(len in 0usize..10, chronic in 1usize..6) {
            let loads = vec![dec!(100); len];
            let outcome = compute_acwr(&loads, 1, chronic);
            prop_assert_eq!(outcome.ratio().is_some(), len >= chronic);
        }
    }
}
