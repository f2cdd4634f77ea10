//! Data layer for the hike journal's SQLite database.
//!
//! Owns the schema and exposes repositories for hikes and their observations.

mod error;
mod filter;
mod hikes;
mod models;
mod observations;
mod store;

pub use filter::HikeFilter;
pub use models::{
    Difficulty, Hike, NewHike, NewObservation, Observation, Parking, ANY_DIFFICULTY,
};
pub use store::Store;
