//! Non-interactive `hike` and `obs` subcommands.
//!
//! Each command validates its form input, calls the repositories on an open
//! store and writes a human-readable (or JSON) result to `out`.

use std::io::Write;

use anyhow::{bail, Context, Result};
use serde_json::json;

use crate::cli::{HikeCommand, HikeFields, ObservationCommand, SearchCriteria};
use crate::data::{Difficulty, Hike, HikeFilter, Observation, Store, ANY_DIFFICULTY};
use crate::form::{HikeForm, ObservationForm, ValidationError};

/// One-line summary of a hike, as shown in lists
pub fn hike_row(hike: &Hike) -> String {
    format!(
        "#{:<4} {} | {} | {} | {} | parking: {} | {}",
        hike.id,
        hike.name,
        hike.location,
        hike.date,
        hike.length_label(),
        hike.parking,
        hike.difficulty
    )
}

pub fn observation_row(observation: &Observation) -> String {
    format!(
        "#{:<4} [{}] {} ({})",
        observation.id,
        observation.time,
        observation.observation,
        observation.comments_or_na()
    )
}

fn apply_fields(form: &mut HikeForm, fields: HikeFields) {
    let HikeFields {
        name,
        location,
        date,
        parking,
        length,
        difficulty,
        description,
        weather,
        gear,
    } = fields;
    let targets = [
        (name, &mut form.name),
        (location, &mut form.location),
        (date, &mut form.date),
        (parking, &mut form.parking),
        (length, &mut form.length),
        (difficulty, &mut form.difficulty),
        (description, &mut form.description),
        (weather, &mut form.weather),
        (gear, &mut form.recommended_gear),
    ];
    for (value, slot) in targets {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

fn write_hikes(out: &mut impl Write, hikes: &[Hike], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(hikes)?)?;
    } else if hikes.is_empty() {
        writeln!(out, "No hikes found.")?;
    } else {
        for hike in hikes {
            writeln!(out, "{}", hike_row(hike))?;
        }
    }
    Ok(())
}

fn write_hike_detail(out: &mut impl Write, hike: &Hike, observations: &[Observation]) -> Result<()> {
    writeln!(out, "{}", hike.name)?;
    writeln!(out, "  Location:          {}", hike.location)?;
    writeln!(out, "  Date:              {}", hike.date)?;
    writeln!(out, "  Parking available: {}", hike.parking)?;
    writeln!(out, "  Length:            {}", hike.length_label())?;
    writeln!(out, "  Difficulty:        {}", hike.difficulty)?;
    writeln!(out, "  Description:       {}", hike.description_or_na())?;
    writeln!(out, "  Weather:           {}", hike.weather_or_na())?;
    writeln!(out, "  Recommended gear:  {}", hike.recommended_gear_or_na())?;
    writeln!(out)?;
    if observations.is_empty() {
        writeln!(out, "No observations yet.")?;
    } else {
        writeln!(out, "Observations:")?;
        for observation in observations {
            writeln!(out, "  {}", observation_row(observation))?;
        }
    }
    Ok(())
}

fn require_hike(store: &Store, id: i64) -> Result<Hike> {
    match store.hikes().get_by_id(id)? {
        Some(hike) => Ok(hike),
        None => bail!("Hike {id} not found"),
    }
}

fn require_confirmation(yes: bool, what: &str) -> Result<()> {
    if !yes {
        bail!("Refusing to delete {what} without --yes");
    }
    Ok(())
}

/// Difficulty is matched by its stored label, so normalise it the way `add` does
fn search_difficulty(text: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    if text.trim().eq_ignore_ascii_case(ANY_DIFFICULTY) {
        return Ok(None);
    }
    let difficulty: Difficulty = text.parse().map_err(ValidationError::InvalidChoice)?;
    Ok(Some(difficulty.as_str().to_string()))
}

fn search_filter(criteria: SearchCriteria) -> Result<HikeFilter> {
    Ok(HikeFilter {
        name: criteria.name,
        location: criteria.location,
        date: criteria.date,
        difficulty: search_difficulty(criteria.difficulty)?,
        min_length: criteria.min_length,
        max_length: criteria.max_length,
    })
}

pub fn run_hike(store: &Store, command: HikeCommand, out: &mut impl Write) -> Result<()> {
    let hikes = store.hikes();
    match command {
        HikeCommand::Add(fields) => {
            let mut form = HikeForm::default();
            apply_fields(&mut form, fields);
            let hike = form.validate()?;
            let id = hikes.add(&hike).context("Error saving hike")?;
            writeln!(out, "Hike saved with id {id}")?;
            write_hike_detail(out, &Hike::from_new(id, hike), &[])?;
        }
        HikeCommand::Edit { id, fields } => {
            let existing = require_hike(store, id)?;
            let mut form = HikeForm::from_hike(&existing.to_new());
            apply_fields(&mut form, fields);
            let updated = Hike::from_new(id, form.validate()?);
            if hikes.update(&updated).context("Error updating hike")? == 0 {
                bail!("Hike {id} not found");
            }
            writeln!(out, "Hike {id} updated")?;
        }
        HikeCommand::Show { id, json } => {
            let hike = require_hike(store, id)?;
            let observations = store.observations().get_for_hike(id)?;
            if json {
                let value = json!({ "hike": hike, "observations": observations });
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            } else {
                write_hike_detail(out, &hike, &observations)?;
            }
        }
        HikeCommand::List { json } => {
            write_hikes(out, &hikes.get_all()?, json)?;
        }
        HikeCommand::Search { criteria, json } => {
            let found = hikes.filter(&search_filter(criteria)?)?;
            write_hikes(out, &found, json)?;
        }
        HikeCommand::Delete { id, yes } => {
            require_confirmation(yes, &format!("hike {id}"))?;
            if hikes.delete(id)? == 0 {
                bail!("Hike {id} not found");
            }
            writeln!(out, "Hike {id} deleted")?;
        }
        HikeCommand::DeleteAll { yes } => {
            require_confirmation(yes, "all hikes")?;
            let removed = hikes.delete_all()?;
            writeln!(out, "Deleted {removed} hikes")?;
        }
    }
    Ok(())
}

pub fn run_observation(
    store: &Store,
    command: ObservationCommand,
    out: &mut impl Write,
) -> Result<()> {
    let observations = store.observations();
    match command {
        ObservationCommand::Add {
            hike_id,
            text,
            time,
            comments,
        } => {
            require_hike(store, hike_id)?;
            let form = ObservationForm {
                observation: text,
                time: time.unwrap_or_default(),
                comments: comments.unwrap_or_default(),
            };
            let id = observations
                .add(&form.validate(hike_id)?)
                .context("Error saving observation")?;
            writeln!(out, "Observation saved with id {id}")?;
        }
        ObservationCommand::List { hike_id, json } => {
            require_hike(store, hike_id)?;
            let listed = observations.get_for_hike(hike_id)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&listed)?)?;
            } else if listed.is_empty() {
                writeln!(out, "No observations yet.")?;
            } else {
                for observation in &listed {
                    writeln!(out, "{}", observation_row(observation))?;
                }
            }
        }
        ObservationCommand::Edit {
            id,
            text,
            time,
            comments,
        } => {
            let Some(existing) = observations.get_by_id(id)? else {
                bail!("Observation {id} not found");
            };
            let form = ObservationForm {
                observation: text.unwrap_or_else(|| existing.observation.clone()),
                time: time.unwrap_or_else(|| existing.time.clone()),
                comments: comments.unwrap_or_else(|| existing.comments.clone().unwrap_or_default()),
            };
            let validated = form.validate(existing.hike_id)?;
            let updated = Observation {
                id,
                hike_id: existing.hike_id,
                observation: validated.observation,
                time: validated.time.unwrap_or(existing.time),
                comments: validated.comments,
            };
            if observations.update(&updated).context("Error updating observation")? == 0 {
                bail!("Observation {id} not found");
            }
            writeln!(out, "Observation {id} updated")?;
        }
        ObservationCommand::Delete { id, yes } => {
            require_confirmation(yes, &format!("observation {id}"))?;
            if observations.delete(id)? == 0 {
                bail!("Observation {id} not found");
            }
            writeln!(out, "Observation {id} deleted")?;
        }
        ObservationCommand::DeleteAll { yes } => {
            require_confirmation(yes, "all observations")?;
            let removed = observations.delete_all()?;
            writeln!(out, "Deleted {removed} observations")?;
        }
    }
    Ok(())
}
