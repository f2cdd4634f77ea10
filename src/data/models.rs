//! Data models for hikes and the observations recorded on them.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Text shown by consumers for optional fields that were left empty
pub const NOT_AVAILABLE: &str = "N/A";

/// Difficulty filter value meaning "no constraint"
pub const ANY_DIFFICULTY: &str = "Any difficulty";

/// Difficulty rating of a hike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty '{s}' (expected Easy, Medium or Hard)"))
    }
}

/// Whether parking is available at the trailhead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parking {
    Yes,
    No,
}

impl Parking {
    pub fn as_str(self) -> &'static str {
        match self {
            Parking::Yes => "Yes",
            Parking::No => "No",
        }
    }
}

impl fmt::Display for Parking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Parking::Yes),
            "no" | "n" => Ok(Parking::No),
            _ => Err(format!("unknown parking value '{s}' (expected Yes or No)")),
        }
    }
}

/// Field values of a hike that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHike {
    pub name: String,
    pub location: String,
    pub date: String,
    pub parking: Parking,
    /// Length in kilometres
    pub length: f64,
    pub difficulty: Difficulty,
    pub description: Option<String>,
    pub weather: Option<String>,
    pub recommended_gear: Option<String>,
}

/// A stored hike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hike {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub date: String,
    pub parking: Parking,
    pub length: f64,
    pub difficulty: Difficulty,
    pub description: Option<String>,
    pub weather: Option<String>,
    pub recommended_gear: Option<String>,
}

impl Hike {
    /// Attach a store-assigned id to a new hike
    pub fn from_new(id: i64, hike: NewHike) -> Self {
        Hike {
            id,
            name: hike.name,
            location: hike.location,
            date: hike.date,
            parking: hike.parking,
            length: hike.length,
            difficulty: hike.difficulty,
            description: hike.description,
            weather: hike.weather,
            recommended_gear: hike.recommended_gear,
        }
    }

    /// Field values without the id, e.g. to re-validate an edited hike
    pub fn to_new(&self) -> NewHike {
        NewHike {
            name: self.name.clone(),
            location: self.location.clone(),
            date: self.date.clone(),
            parking: self.parking,
            length: self.length,
            difficulty: self.difficulty,
            description: self.description.clone(),
            weather: self.weather.clone(),
            recommended_gear: self.recommended_gear.clone(),
        }
    }

    pub fn length_label(&self) -> String {
        format!("{} km", self.length)
    }

    pub fn description_or_na(&self) -> &str {
        or_not_available(self.description.as_deref())
    }

    pub fn weather_or_na(&self) -> &str {
        or_not_available(self.weather.as_deref())
    }

    pub fn recommended_gear_or_na(&self) -> &str {
        or_not_available(self.recommended_gear.as_deref())
    }
}

/// An observation that has not been stored yet.
///
/// `time` may be left empty; the repository fills in the current time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObservation {
    pub hike_id: i64,
    pub observation: String,
    pub time: Option<String>,
    pub comments: Option<String>,
}

/// A stored observation belonging to a hike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub hike_id: i64,
    pub observation: String,
    pub time: String,
    pub comments: Option<String>,
}

impl Observation {
    pub fn comments_or_na(&self) -> &str {
        or_not_available(self.comments.as_deref())
    }
}

// Both enums are stored as their display label
impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl ToSql for Parking {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Parking {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

fn or_not_available(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}
