//! Form validation run before anything is written to the store.
//!
//! Forms carry raw text exactly as entered. Required fields must be non-blank
//! and the length must be a non-negative number; optional fields that are
//! blank are stored as absent.

use crate::data::{Difficulty, NewHike, NewObservation, Parking};

/// Why a form was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Length must be a non-negative number of kilometres, got '{0}'")]
    InvalidLength(String),

    #[error("{0}")]
    InvalidChoice(String),
}

/// Raw hike form input
#[derive(Debug, Clone, Default)]
pub struct HikeForm {
    pub name: String,
    pub location: String,
    pub date: String,
    pub parking: String,
    pub length: String,
    pub difficulty: String,
    pub description: String,
    pub weather: String,
    pub recommended_gear: String,
}

impl HikeForm {
    /// Pre-fill a form with the values of an existing hike
    pub fn from_hike(hike: &NewHike) -> Self {
        HikeForm {
            name: hike.name.clone(),
            location: hike.location.clone(),
            date: hike.date.clone(),
            parking: hike.parking.to_string(),
            length: hike.length.to_string(),
            difficulty: hike.difficulty.to_string(),
            description: hike.description.clone().unwrap_or_default(),
            weather: hike.weather.clone().unwrap_or_default(),
            recommended_gear: hike.recommended_gear.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<NewHike, ValidationError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("location", &self.location),
            ("date", &self.date),
            ("parking", &self.parking),
            ("length", &self.length),
            ("difficulty", &self.difficulty),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let length = parse_length(&self.length)?;
        let parking: Parking = self
            .parking
            .parse()
            .map_err(ValidationError::InvalidChoice)?;
        let difficulty: Difficulty = self
            .difficulty
            .parse()
            .map_err(ValidationError::InvalidChoice)?;

        Ok(NewHike {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            date: self.date.trim().to_string(),
            parking,
            length,
            difficulty,
            description: optional(&self.description),
            weather: optional(&self.weather),
            recommended_gear: optional(&self.recommended_gear),
        })
    }
}

/// Raw observation form input
#[derive(Debug, Clone, Default)]
pub struct ObservationForm {
    pub observation: String,
    /// Blank means "now"
    pub time: String,
    pub comments: String,
}

impl ObservationForm {
    pub fn validate(&self, hike_id: i64) -> Result<NewObservation, ValidationError> {
        if self.observation.trim().is_empty() {
            return Err(ValidationError::MissingFields(vec!["observation"]));
        }
        Ok(NewObservation {
            hike_id,
            observation: self.observation.trim().to_string(),
            time: optional(&self.time),
            comments: optional(&self.comments),
        })
    }
}

/// Parse a length in kilometres, rejecting negatives and non-finite values
pub fn parse_length(text: &str) -> Result<f64, ValidationError> {
    match text.trim().parse::<f64>() {
        Ok(km) if km.is_finite() && km >= 0.0 => Ok(km),
        _ => Err(ValidationError::InvalidLength(text.to_string())),
    }
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
