use crate::benchmarks::{BenchmarkSet, BenchmarkSpec};
use crate::models::{MetricKey, Zone};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Traffic-light classification against a benchmark set
#[derive(Debug, Clone, Copy)]
pub struct ZoneClassifier {
    benchmarks: BenchmarkSet,
}

impl ZoneClassifier {
    pub fn new(benchmarks: BenchmarkSet) -> Self {
        ZoneClassifier { benchmarks }
    }

    /// Classify a single metric value. Gray when the set has no benchmark for the metric.
    pub fn classify(&self, value: Decimal, metric: MetricKey) -> Zone {
        match self.benchmarks.get(metric) {
            Some(spec) => Self::classify_against(value, spec),
            None => Zone::Gray,
        }
    }

    /// Bands overlap at their edges, so the order of checks decides boundary values.
    /// Red is an exclusion range and is checked first; values in a gap between bands are yellow.
    pub fn classify_against(value: Decimal, spec: &BenchmarkSpec) -> Zone {
        if value < spec.red_low || value > spec.red_high {
            Zone::Red
        } else if spec.orange.contains(value) {
            Zone::Orange
        } else if spec.yellow.contains(value) {
            Zone::Yellow
        } else if spec.green.contains(value) {
            Zone::Green
        } else {
            Zone::Yellow
        }
    }

    /// Training target for a metric (match average scaled by the target fraction)
    pub fn training_target(&self, metric: MetricKey) -> Option<Decimal> {
        self.benchmarks.get(metric).map(BenchmarkSpec::training_target)
    }

    /// Percentage difference of a value from the metric's training target
    pub fn percent_vs_target(&self, value: Decimal, metric: MetricKey) -> Option<Decimal> {
        let target = self.training_target(metric)?;
        if target.is_zero() {
            return None;
        }
        Some(((value / target) - Decimal::ONE) * dec!(100))
    }
}

/// Classify a value against an explicit benchmark set
pub fn classify(value: Decimal, metric: MetricKey, benchmarks: &BenchmarkSet) -> Zone {
    ZoneClassifier::new(*benchmarks).classify(value, metric)
}
