//! Deterministic synthetic squad data for demos, tests and benchmarks

use crate::models::{Position, SessionRecord, SessionType};
use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Day offsets within a week; the last session is the match
const SESSION_DAYS: [u64; 4] = [0, 2, 4, 6];

const POSITION_CYCLE: [Position; 10] = [
    Position::Goalkeeper,
    Position::Defender,
    Position::Defender,
    Position::Defender,
    Position::Midfielder,
    Position::Midfielder,
    Position::Midfielder,
    Position::Midfielder,
    Position::Forward,
    Position::Forward,
];

const BASE_TOTAL_DISTANCE: f64 = 6500.0;
const BASE_HSR: f64 = 1200.0;
const BASE_SPRINT: f64 = 300.0;
const BASE_ACCELS: f64 = 60.0;
const BASE_DECELS: f64 = 55.0;
const BASE_LOAD: f64 = 650.0;
const MATCH_FACTOR: f64 = 1.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub seed: u64,
    pub athletes: usize,
    pub weeks: usize,
    pub start_date: NaiveDate,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        FixtureConfig {
            seed: 42,
            athletes: 20,
            weeks: 8,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

/// Generates a squad's season of session records
pub struct FixtureGenerator {
    config: FixtureConfig,
}

impl FixtureGenerator {
    pub fn new() -> Self {
        Self::with_config(FixtureConfig::default())
    }

    pub fn with_config(config: FixtureConfig) -> Self {
        FixtureGenerator { config }
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Generate with a ChaCha8 stream seeded from the configured seed
    pub fn generate_seeded(&self) -> Vec<SessionRecord> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.generate(&mut rng)
    }

    /// Generate using the supplied random source. Records are ordered by
    /// week, then session, then athlete.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<SessionRecord> {
        let cfg = &self.config;
        let mut records = Vec::with_capacity(cfg.weeks * SESSION_DAYS.len() * cfg.athletes);

        for week in 0..cfg.weeks {
            let overload = 0.85 + (week as f64 / cfg.weeks as f64) * 0.3;

            for (session, offset) in SESSION_DAYS.iter().enumerate() {
                let session_type = if session == SESSION_DAYS.len() - 1 {
                    SessionType::Match
                } else {
                    SessionType::Training
                };
                let match_factor = match session_type {
                    SessionType::Match => MATCH_FACTOR,
                    SessionType::Training => 1.0,
                };
                let Some(date) = cfg
                    .start_date
                    .checked_add_days(Days::new(week as u64 * 7 + offset))
                else {
                    continue;
                };

                for athlete in 0..cfg.athletes {
                    let position = POSITION_CYCLE[athlete % POSITION_CYCLE.len()];
                    let jitter = rng.gen_range(0.85..1.15);
                    let combined = position_factor(position) * match_factor * overload * jitter;

                    let duration = 90.0 * match_factor * rng.gen_range(0.9..1.1);
                    let max_speed = 28.0 + rng.gen_range(-3.0..3.0);

                    records.push(SessionRecord {
                        date,
                        athlete_id: format!("Player {}", athlete + 1),
                        position: Some(position),
                        session_type: Some(session_type),
                        duration_minutes: Some(truncated(duration)),
                        total_distance_m: truncated(BASE_TOTAL_DISTANCE * combined),
                        hsr_distance_m: truncated(BASE_HSR * combined),
                        sprint_distance_m: truncated(BASE_SPRINT * combined),
                        accel_count: (BASE_ACCELS * combined) as u32,
                        decel_count: (BASE_DECELS * combined) as u32,
                        player_load: tenths(BASE_LOAD * combined),
                        max_speed_kmh: Some(tenths(max_speed)),
                    });
                }
            }
        }

        debug!(
            seed = cfg.seed,
            athletes = cfg.athletes,
            weeks = cfg.weeks,
            records = records.len(),
            "Generated fixture sessions"
        );

        records
    }
}

impl Default for FixtureGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn position_factor(position: Position) -> f64 {
    match position {
        Position::Midfielder => 1.0,
        Position::Defender | Position::Forward => 0.9,
        Position::Goalkeeper => 0.6,
    }
}

fn truncated(value: f64) -> Decimal {
    Decimal::from(value.trunc() as i64)
}

fn tenths(value: f64) -> Decimal {
    Decimal::new((value * 10.0).round() as i64, 1)
}
