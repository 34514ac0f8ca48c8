//! Sport benchmark tables used by the traffic-light classifier.
//!
//! Values for field hockey follow published elite match data
//! (Buchheit & Laursen 2013, Jennings et al. 2012).

use crate::error::CalculationError;
use crate::models::MetricKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Inclusive value band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Band {
    pub low: Decimal,
    pub high: Decimal,
}

impl Band {
    pub const fn new(low: Decimal, high: Decimal) -> Self {
        Band { low, high }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Benchmark bands and reference values for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BenchmarkSpec {
    /// Display unit ("m", "n", "AU")
    pub unit: &'static str,

    /// Typical match value for an outfield player
    pub match_average: Decimal,

    /// Fraction of the match value a training session should reach
    pub training_target_fraction: Decimal,

    pub green: Band,
    pub yellow: Band,
    pub orange: Band,

    /// Values strictly below this are red
    pub red_low: Decimal,

    /// Values strictly above this are red
    pub red_high: Decimal,
}

impl BenchmarkSpec {
    /// Session target derived from the match average
    pub fn training_target(&self) -> Decimal {
        self.match_average * self.training_target_fraction
    }
}

/// A named, versioned benchmark table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BenchmarkSet {
    pub name: &'static str,
    pub version: u32,
    pub metrics: &'static [(MetricKey, BenchmarkSpec)],
}

impl BenchmarkSet {
    /// Benchmark for a metric, if this set defines one
    pub fn get(&self, metric: MetricKey) -> Option<&BenchmarkSpec> {
        self.metrics
            .iter()
            .find(|(key, _)| *key == metric)
            .map(|(_, spec)| spec)
    }

    /// Identifier in `name@vN` form
    pub fn id(&self) -> String {
        format!("{}@v{}", self.name, self.version)
    }
}

/// Elite field hockey benchmarks, first revision
pub const FIELD_HOCKEY_V1: BenchmarkSet = BenchmarkSet {
    name: "field-hockey",
    version: 1,
    metrics: &[
        (
            MetricKey::TotalDistance,
            BenchmarkSpec {
                unit: "m",
                match_average: dec!(9500),
                training_target_fraction: dec!(0.70),
                green: Band::new(dec!(6000), dec!(8000)),
                yellow: Band::new(dec!(8000), dec!(9500)),
                orange: Band::new(dec!(9500), dec!(11000)),
                red_low: dec!(5000),
                red_high: dec!(11000),
            },
        ),
        // >16 km/h
        (
            MetricKey::HsrDistance,
            BenchmarkSpec {
                unit: "m",
                match_average: dec!(1800),
                training_target_fraction: dec!(0.65),
                green: Band::new(dec!(1000), dec!(1500)),
                yellow: Band::new(dec!(1500), dec!(1800)),
                orange: Band::new(dec!(1800), dec!(2200)),
                red_low: dec!(800),
                red_high: dec!(2200),
            },
        ),
        // >21 km/h
        (
            MetricKey::SprintDistance,
            BenchmarkSpec {
                unit: "m",
                match_average: dec!(450),
                training_target_fraction: dec!(0.60),
                green: Band::new(dec!(200), dec!(350)),
                yellow: Band::new(dec!(350), dec!(450)),
                orange: Band::new(dec!(450), dec!(600)),
                red_low: dec!(150),
                red_high: dec!(600),
            },
        ),
        // >2.5 m/s²
        (
            MetricKey::AccelCount,
            BenchmarkSpec {
                unit: "n",
                match_average: dec!(85),
                training_target_fraction: dec!(0.70),
                green: Band::new(dec!(50), dec!(70)),
                yellow: Band::new(dec!(70), dec!(85)),
                orange: Band::new(dec!(85), dec!(100)),
                red_low: dec!(40),
                red_high: dec!(100),
            },
        ),
        // <-2.5 m/s²
        (
            MetricKey::DecelCount,
            BenchmarkSpec {
                unit: "n",
                match_average: dec!(80),
                training_target_fraction: dec!(0.70),
                green: Band::new(dec!(45), dec!(65)),
                yellow: Band::new(dec!(65), dec!(80)),
                orange: Band::new(dec!(80), dec!(95)),
                red_low: dec!(35),
                red_high: dec!(95),
            },
        ),
        (
            MetricKey::PlayerLoad,
            BenchmarkSpec {
                unit: "AU",
                match_average: dec!(950),
                training_target_fraction: dec!(0.70),
                green: Band::new(dec!(500), dec!(750)),
                yellow: Band::new(dec!(750), dec!(900)),
                orange: Band::new(dec!(900), dec!(1100)),
                red_low: dec!(400),
                red_high: dec!(1100),
            },
        ),
    ],
};

/// Every benchmark set shipped with the crate
pub const BUILTIN_SETS: &[BenchmarkSet] = &[FIELD_HOCKEY_V1];

/// Resolve a built-in set by `name` (latest version) or `name@vN`
pub fn by_name(name: &str) -> Result<BenchmarkSet, CalculationError> {
    let unknown = || CalculationError::UnknownBenchmarkSet {
        name: name.to_string(),
    };

    let (set_name, version) = match name.split_once("@v") {
        Some((set_name, version)) => (set_name, Some(version.parse::<u32>().map_err(|_| unknown())?)),
        None => (name, None),
    };

    BUILTIN_SETS
        .iter()
        .filter(|set| set.name == set_name)
        .filter(|set| version.map_or(true, |v| set.version == v))
        .max_by_key(|set| set.version)
        .copied()
        .ok_or_else(unknown)
}
