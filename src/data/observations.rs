//! Observation repository: CRUD over the `observations` table, scoped by hike.

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::error::StoreResult;
use super::models::{NewObservation, Observation};

/// Format of generated observation timestamps
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_OBSERVATION: &str =
    "SELECT id, hike_id, observation, time, comments FROM observations";

fn row_to_observation(row: &Row) -> rusqlite::Result<Observation> {
    Ok(Observation {
        id: row.get(0)?,
        hike_id: row.get(1)?,
        observation: row.get(2)?,
        time: row.get(3)?,
        comments: row.get(4)?,
    })
}

/// Current local time in [`TIME_FORMAT`]
pub fn current_time() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

/// Access to stored observations, borrowed from an open [`super::Store`]
pub struct ObservationRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ObservationRepository<'a> {
    pub(super) fn new(conn: &'a Connection) -> Self {
        ObservationRepository { conn }
    }

    /// Insert an observation and return its new id.
    ///
    /// A missing or blank `time` is replaced with the current local time.
    /// Fails if `hike_id` does not name a stored hike.
    pub fn add(&self, observation: &NewObservation) -> StoreResult<i64> {
        let time = match observation.time.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => current_time(),
        };
        self.conn.execute(
            "INSERT INTO observations (hike_id, observation, time, comments) VALUES (?1, ?2, ?3, ?4)",
            params![
                observation.hike_id,
                observation.observation,
                time,
                observation.comments,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, hike_id = observation.hike_id, "Added observation");
        Ok(id)
    }

    /// Observations recorded on one hike, oldest first
    pub fn get_for_hike(&self, hike_id: i64) -> StoreResult<Vec<Observation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_OBSERVATION} WHERE hike_id = ?1 ORDER BY id"))?;
        let observations = stmt
            .query_map([hike_id], row_to_observation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(observations)
    }

    pub fn get_by_id(&self, id: i64) -> StoreResult<Option<Observation>> {
        let observation = self
            .conn
            .query_row(
                &format!("{SELECT_OBSERVATION} WHERE id = ?1"),
                [id],
                row_to_observation,
            )
            .optional()?;
        Ok(observation)
    }

    /// Overwrite text, time and comments of the observation with the same id.
    /// The owning hike is left unchanged. Returns 0 when no row matched.
    pub fn update(&self, observation: &Observation) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE observations SET observation = ?1, time = ?2, comments = ?3 WHERE id = ?4",
            params![
                observation.observation,
                observation.time,
                observation.comments,
                observation.id,
            ],
        )?;
        debug!(id = observation.id, changed, "Updated observation");
        Ok(changed)
    }

    pub fn delete(&self, id: i64) -> StoreResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM observations WHERE id = ?1", [id])?;
        debug!(id, removed, "Deleted observation");
        Ok(removed)
    }

    pub fn delete_all(&self) -> StoreResult<usize> {
        let removed = self.conn.execute("DELETE FROM observations", [])?;
        info!(removed, "Deleted all observations");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{Difficulty, NewHike, Parking};
    use crate::data::error::StoreError;
    use crate::data::Store;

    fn store_with_hike() -> (Store, i64) {
        let store = Store::open_in_memory().unwrap();
        let hike_id = store
            .hikes()
            .add(&NewHike {
                name: "Coast Walk".to_string(),
                location: "Cliffside".to_string(),
                date: "5/6/2024".to_string(),
                parking: Parking::Yes,
                length: 8.2,
                difficulty: Difficulty::Medium,
                description: None,
                weather: None,
                recommended_gear: None,
            })
            .unwrap();
        (store, hike_id)
    }

    fn note(hike_id: i64, text: &str, time: Option<&str>) -> NewObservation {
        NewObservation {
            hike_id,
            observation: text.to_string(),
            time: time.map(str::to_string),
            comments: None,
        }
    }

    #[test]
    fn test_get_for_hike_returns_insertion_order() {
        let (store, hike_id) = store_with_hike();
        let repo = store.observations();

        let first = repo
            .add(&note(hike_id, "Gannets diving", Some("2024-06-05 10:00:00")))
            .unwrap();
        let second = repo
            .add(&note(hike_id, "Seal colony", Some("2024-06-05 11:30:00")))
            .unwrap();

        let listed = repo.get_for_hike(hike_id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[0].observation, "Gannets diving");
        assert_eq!(listed[1].id, second);
        assert_eq!(listed[1].time, "2024-06-05 11:30:00");

        assert_eq!(repo.delete(first).unwrap(), 1);
        let remaining = repo.get_for_hike(hike_id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second);
    }

    #[test]
    fn test_missing_time_defaults_to_now() {
        let (store, hike_id) = store_with_hike();
        let repo = store.observations();

        let id = repo.add(&note(hike_id, "Kestrel", None)).unwrap();
        let blank = repo.add(&note(hike_id, "Adder", Some("  "))).unwrap();

        for id in [id, blank] {
            let stored = repo.get_by_id(id).unwrap().unwrap();
            assert!(
                chrono::NaiveDateTime::parse_from_str(&stored.time, TIME_FORMAT).is_ok(),
                "unexpected default time {:?}",
                stored.time
            );
        }
    }

    #[test]
    fn test_scoped_to_hike() {
        let (store, hike_id) = store_with_hike();
        let repo = store.observations();
        repo.add(&note(hike_id, "Gannets", None)).unwrap();

        assert!(repo.get_for_hike(hike_id + 1).unwrap().is_empty());
    }

    #[test]
    fn test_add_for_missing_hike_fails() {
        let (store, hike_id) = store_with_hike();
        let result = store.observations().add(&note(hike_id + 100, "Lost", None));
        assert!(matches!(result, Err(StoreError::Sqlite(_))));
    }

    #[test]
    fn test_update_and_not_found() {
        let (store, hike_id) = store_with_hike();
        let repo = store.observations();
        let id = repo.add(&note(hike_id, "Gannets", None)).unwrap();

        let mut stored = repo.get_by_id(id).unwrap().unwrap();
        stored.observation = "Gannets and puffins".to_string();
        stored.time = "2024-06-05 12:00:00".to_string();
        stored.comments = Some("Near the lighthouse".to_string());

        assert_eq!(repo.update(&stored).unwrap(), 1);
        assert_eq!(repo.get_by_id(id).unwrap().unwrap(), stored);

        stored.id += 1;
        assert_eq!(repo.update(&stored).unwrap(), 0);
        assert!(repo.get_by_id(stored.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_all() {
        let (store, hike_id) = store_with_hike();
        let repo = store.observations();
        repo.add(&note(hike_id, "Gannets", None)).unwrap();
        repo.add(&note(hike_id, "Seals", None)).unwrap();

        assert_eq!(repo.delete_all().unwrap(), 2);
        assert!(repo.get_for_hike(hike_id).unwrap().is_empty());
        assert!(store.hikes().get_by_id(hike_id).unwrap().is_some());
    }
}
