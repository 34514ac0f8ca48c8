use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Playing position recorded against a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    /// Short code used in exports ("GK", "DEF", "MID", "FWD")
    pub fn code(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gk" | "goalkeeper" | "keeper" => Ok(Position::Goalkeeper),
            "def" | "defender" | "back" => Ok(Position::Defender),
            "mid" | "midfielder" | "midfield" => Ok(Position::Midfielder),
            "fwd" | "forward" | "striker" => Ok(Position::Forward),
            _ => Err(format!("Unknown position: {}", s)),
        }
    }
}

/// Kind of session the GPS data was captured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Training,
    Match,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Training => f.write_str("Training"),
            SessionType::Match => f.write_str("Match"),
        }
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "training" | "train" | "practice" => Ok(SessionType::Training),
            "match" | "game" | "fixture" => Ok(SessionType::Match),
            _ => Err(format!("Unknown session type: {}", s)),
        }
    }
}

/// Canonical column set every vendor export is normalized onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Date,
    Player,
    Position,
    SessionType,
    DurationMinutes,
    TotalDistance,
    HsrDistance,
    SprintDistance,
    Accelerations,
    Decelerations,
    PlayerLoad,
    MaxSpeed,
}

impl CanonicalField {
    /// All canonical fields in export order
    pub const ALL: [CanonicalField; 12] = [
        CanonicalField::Date,
        CanonicalField::Player,
        CanonicalField::Position,
        CanonicalField::SessionType,
        CanonicalField::DurationMinutes,
        CanonicalField::TotalDistance,
        CanonicalField::HsrDistance,
        CanonicalField::SprintDistance,
        CanonicalField::Accelerations,
        CanonicalField::Decelerations,
        CanonicalField::PlayerLoad,
        CanonicalField::MaxSpeed,
    ];

    /// Exact header text in the canonical schema
    pub fn header(&self) -> &'static str {
        match self {
            CanonicalField::Date => "Date",
            CanonicalField::Player => "Player",
            CanonicalField::Position => "Position",
            CanonicalField::SessionType => "Session Type",
            CanonicalField::DurationMinutes => "Duration (min)",
            CanonicalField::TotalDistance => "Total Distance (m)",
            CanonicalField::HsrDistance => "HSR Distance (m)",
            CanonicalField::SprintDistance => "Sprint Distance (m)",
            CanonicalField::Accelerations => "Accelerations",
            CanonicalField::Decelerations => "Decelerations",
            CanonicalField::PlayerLoad => "Player Load (AU)",
            CanonicalField::MaxSpeed => "Max Speed (km/h)",
        }
    }

    /// Look up a canonical field by its exact header
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.header() == header)
    }

    /// Whether a record can be built without this column
    pub fn is_required(&self) -> bool {
        !matches!(
            self,
            CanonicalField::Position
                | CanonicalField::SessionType
                | CanonicalField::DurationMinutes
                | CanonicalField::MaxSpeed
        )
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for CanonicalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_header(s.trim()).ok_or_else(|| format!("Unknown canonical column: {}", s))
    }
}

/// Additive, benchmarked session metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    TotalDistance,
    HsrDistance,
    SprintDistance,
    AccelCount,
    DecelCount,
    PlayerLoad,
}

impl MetricKey {
    pub const ALL: [MetricKey; 6] = [
        MetricKey::TotalDistance,
        MetricKey::HsrDistance,
        MetricKey::SprintDistance,
        MetricKey::AccelCount,
        MetricKey::DecelCount,
        MetricKey::PlayerLoad,
    ];

    /// snake_case key used in configuration and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            MetricKey::TotalDistance => "total_distance",
            MetricKey::HsrDistance => "hsr_distance",
            MetricKey::SprintDistance => "sprint_distance",
            MetricKey::AccelCount => "accel_count",
            MetricKey::DecelCount => "decel_count",
            MetricKey::PlayerLoad => "player_load",
        }
    }

    /// Canonical column this metric is read from
    pub fn field(&self) -> CanonicalField {
        match self {
            MetricKey::TotalDistance => CanonicalField::TotalDistance,
            MetricKey::HsrDistance => CanonicalField::HsrDistance,
            MetricKey::SprintDistance => CanonicalField::SprintDistance,
            MetricKey::AccelCount => CanonicalField::Accelerations,
            MetricKey::DecelCount => CanonicalField::Decelerations,
            MetricKey::PlayerLoad => CanonicalField::PlayerLoad,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MetricKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|m| m.key() == normalized)
            .ok_or_else(|| format!("Unknown metric: {}", s))
    }
}

/// Traffic-light classification of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Green => "green",
            Zone::Yellow => "yellow",
            Zone::Orange => "orange",
            Zone::Red => "red",
            Zone::Gray => "gray",
        };
        f.write_str(name)
    }
}

/// One athlete's GPS summary for one session, in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Calendar day of the session
    pub date: NaiveDate,

    /// Athlete identifier (the vendor's player name)
    pub athlete_id: String,

    /// Playing position, when the export carries it
    pub position: Option<Position>,

    /// Training or match, when the export carries it
    pub session_type: Option<SessionType>,

    /// Session duration in minutes
    pub duration_minutes: Option<Decimal>,

    /// Total distance covered in meters
    pub total_distance_m: Decimal,

    /// High-speed running distance in meters
    pub hsr_distance_m: Decimal,

    /// Sprint distance in meters
    pub sprint_distance_m: Decimal,

    /// High-intensity acceleration efforts
    pub accel_count: u32,

    /// High-intensity deceleration efforts
    pub decel_count: u32,

    /// Composite load in arbitrary units
    pub player_load: Decimal,

    /// Peak speed in km/h
    pub max_speed_kmh: Option<Decimal>,
}

impl SessionRecord {
    /// Value of an additive metric on this record
    pub fn metric(&self, metric: MetricKey) -> Decimal {
        match metric {
            MetricKey::TotalDistance => self.total_distance_m,
            MetricKey::HsrDistance => self.hsr_distance_m,
            MetricKey::SprintDistance => self.sprint_distance_m,
            MetricKey::AccelCount => Decimal::from(self.accel_count),
            MetricKey::DecelCount => Decimal::from(self.decel_count),
            MetricKey::PlayerLoad => self.player_load,
        }
    }

    /// Render one canonical field the way it appears in an exported table
    pub fn field_value(&self, field: CanonicalField) -> String {
        match field {
            CanonicalField::Date => self.date.format("%Y-%m-%d").to_string(),
            CanonicalField::Player => self.athlete_id.clone(),
            CanonicalField::Position => self.position.map_or(String::new(), |p| p.to_string()),
            CanonicalField::SessionType => {
                self.session_type.map_or(String::new(), |s| s.to_string())
            }
            CanonicalField::DurationMinutes => {
                self.duration_minutes.map_or(String::new(), |d| d.to_string())
            }
            CanonicalField::TotalDistance => self.total_distance_m.to_string(),
            CanonicalField::HsrDistance => self.hsr_distance_m.to_string(),
            CanonicalField::SprintDistance => self.sprint_distance_m.to_string(),
            CanonicalField::Accelerations => self.accel_count.to_string(),
            CanonicalField::Decelerations => self.decel_count.to_string(),
            CanonicalField::PlayerLoad => self.player_load.to_string(),
            CanonicalField::MaxSpeed => self.max_speed_kmh.map_or(String::new(), |s| s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_headers_round_trip() {
        for field in CanonicalField::ALL {
            assert_eq!(CanonicalField::from_header(field.header()), Some(field));
        }
        assert_eq!(CanonicalField::from_header("Player Name"), None);
    }

    #[test]
    fn test_required_fields() {
        assert!(CanonicalField::Date.is_required());
        assert!(CanonicalField::PlayerLoad.is_required());
        assert!(!CanonicalField::Position.is_required());
        assert!(!CanonicalField::MaxSpeed.is_required());
    }

    #[test]
    fn test_metric_key_parsing() {
        assert_eq!("total_distance".parse::<MetricKey>().unwrap(), MetricKey::TotalDistance);
        assert_eq!("Player Load".parse::<MetricKey>().unwrap(), MetricKey::PlayerLoad);
        assert!("max_speed".parse::<MetricKey>().is_err());
    }

    #[test]
    fn test_position_and_session_parsing() {
        assert_eq!("mid".parse::<Position>().unwrap(), Position::Midfielder);
        assert_eq!("Goalkeeper".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert_eq!("Match".parse::<SessionType>().unwrap(), SessionType::Match);
        assert!("scrimmage".parse::<SessionType>().is_err());
    }

    #[test]
    fn test_zone_display() {
        assert_eq!(Zone::Orange.to_string(), "orange");
        assert_eq!(serde_json::to_string(&Zone::Gray).unwrap(), "\"gray\"");
    }
}
