//! Hike repository: CRUD and filtering over the `hikes` table.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::error::StoreResult;
use super::filter::HikeFilter;
use super::models::{Hike, NewHike};

const SELECT_HIKE: &str = "SELECT id, name, location, date, parking_available, length, \
     difficulty, description, weather, recommended_gear FROM hikes";

fn row_to_hike(row: &Row) -> rusqlite::Result<Hike> {
    Ok(Hike {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        date: row.get(3)?,
        parking: row.get(4)?,
        length: row.get(5)?,
        difficulty: row.get(6)?,
        description: row.get(7)?,
        weather: row.get(8)?,
        recommended_gear: row.get(9)?,
    })
}

/// Access to stored hikes, borrowed from an open [`super::Store`]
pub struct HikeRepository<'a> {
    conn: &'a Connection,
}

impl<'a> HikeRepository<'a> {
    pub(super) fn new(conn: &'a Connection) -> Self {
        HikeRepository { conn }
    }

    /// Insert a hike and return its new id
    pub fn add(&self, hike: &NewHike) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO hikes (name, location, date, parking_available, length, difficulty, \
             description, weather, recommended_gear) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                hike.name,
                hike.location,
                hike.date,
                hike.parking,
                hike.length,
                hike.difficulty,
                hike.description,
                hike.weather,
                hike.recommended_gear,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %hike.name, "Added hike");
        Ok(id)
    }

    /// All hikes. Callers should not depend on the order.
    pub fn get_all(&self) -> StoreResult<Vec<Hike>> {
        self.query(&HikeFilter::default())
    }

    pub fn get_by_id(&self, id: i64) -> StoreResult<Option<Hike>> {
        let hike = self
            .conn
            .query_row(&format!("{SELECT_HIKE} WHERE id = ?1"), [id], row_to_hike)
            .optional()?;
        Ok(hike)
    }

    /// Overwrite every field of the hike with the same id.
    /// Returns the number of rows changed; 0 means no such hike.
    pub fn update(&self, hike: &Hike) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE hikes SET name = ?1, location = ?2, date = ?3, parking_available = ?4, \
             length = ?5, difficulty = ?6, description = ?7, weather = ?8, \
             recommended_gear = ?9 WHERE id = ?10",
            params![
                hike.name,
                hike.location,
                hike.date,
                hike.parking,
                hike.length,
                hike.difficulty,
                hike.description,
                hike.weather,
                hike.recommended_gear,
                hike.id,
            ],
        )?;
        debug!(id = hike.id, changed, "Updated hike");
        Ok(changed)
    }

    /// Delete one hike. Its observations go with it.
    pub fn delete(&self, id: i64) -> StoreResult<usize> {
        let removed = self.conn.execute("DELETE FROM hikes WHERE id = ?1", [id])?;
        debug!(id, removed, "Deleted hike");
        Ok(removed)
    }

    /// Delete every hike, and with them every observation
    pub fn delete_all(&self) -> StoreResult<usize> {
        let removed = self.conn.execute("DELETE FROM hikes", [])?;
        info!(removed, "Deleted all hikes");
        Ok(removed)
    }

    /// Hikes matching every supplied criterion of `filter`
    pub fn filter(&self, filter: &HikeFilter) -> StoreResult<Vec<Hike>> {
        if filter.is_empty() {
            debug!("Empty hike filter matches every hike");
        }
        self.query(filter)
    }

    fn query(&self, filter: &HikeFilter) -> StoreResult<Vec<Hike>> {
        let clause = filter.where_clause();
        let sql = format!("{SELECT_HIKE}{} ORDER BY id", clause.sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let hikes = stmt
            .query_map(params_from_iter(clause.params()), row_to_hike)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hikes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::StoreError;
    use crate::data::models::{Difficulty, NewObservation, Parking};
    use crate::data::Store;

    fn new_hike(name: &str, location: &str, date: &str, length: f64, difficulty: Difficulty) -> NewHike {
        NewHike {
            name: name.to_string(),
            location: location.to_string(),
            date: date.to_string(),
            parking: Parking::Yes,
            length,
            difficulty,
            description: None,
            weather: None,
            recommended_gear: None,
        }
    }

    fn coast_walk() -> NewHike {
        new_hike("Coast Walk", "Cliffside", "5/6/2024", 8.2, Difficulty::Medium)
    }

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        let hikes = store.hikes();
        hikes.add(&coast_walk()).unwrap();
        hikes
            .add(&new_hike("Ridge Trail", "High Peaks", "1/7/2024", 12.0, Difficulty::Hard))
            .unwrap();
        hikes
            .add(&new_hike("Short Ridge", "Valley", "1/7/2024", 3.5, Difficulty::Easy))
            .unwrap();
        hikes
            .add(&new_hike("Forest Loop", "Woodland Park", "9/9/2024", 5.0, Difficulty::Easy))
            .unwrap();
        drop(hikes);
        store
    }

    fn names(hikes: &[Hike]) -> Vec<&str> {
        hikes.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_add_then_get_round_trips() {
        let store = Store::open_in_memory().unwrap();
        let mut hike = coast_walk();
        hike.description = Some("Windy headland path".to_string());
        hike.weather = Some("Sunny".to_string());
        hike.recommended_gear = Some("Windproof jacket".to_string());

        let id = store.hikes().add(&hike).unwrap();
        let fetched = store.hikes().get_by_id(id).unwrap().unwrap();

        assert_eq!(fetched, Hike::from_new(id, hike));
    }

    #[test]
    fn test_ids_are_unique() {
        let store = Store::open_in_memory().unwrap();
        let first = store.hikes().add(&coast_walk()).unwrap();
        let second = store.hikes().add(&coast_walk()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_get_by_id_missing_is_none() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.hikes().get_by_id(42).unwrap().is_none());
    }

    #[test]
    fn test_update_overwrites_row() {
        let store = Store::open_in_memory().unwrap();
        let id = store.hikes().add(&coast_walk()).unwrap();

        let mut hike = store.hikes().get_by_id(id).unwrap().unwrap();
        hike.name = "Coast Walk North".to_string();
        hike.length = 9.1;
        hike.difficulty = Difficulty::Hard;
        hike.weather = Some("Drizzle".to_string());

        assert_eq!(store.hikes().update(&hike).unwrap(), 1);
        assert_eq!(store.hikes().get_by_id(id).unwrap().unwrap(), hike);
    }

    #[test]
    fn test_update_with_same_values_is_stable() {
        let store = Store::open_in_memory().unwrap();
        let id = store.hikes().add(&coast_walk()).unwrap();
        let hike = store.hikes().get_by_id(id).unwrap().unwrap();

        assert_eq!(store.hikes().update(&hike).unwrap(), 1);
        assert_eq!(store.hikes().get_by_id(id).unwrap().unwrap(), hike);
    }

    #[test]
    fn test_update_missing_reports_zero_rows() {
        let store = Store::open_in_memory().unwrap();
        let ghost = Hike::from_new(99, coast_walk());
        assert_eq!(store.hikes().update(&ghost).unwrap(), 0);
    }

    #[test]
    fn test_delete_and_delete_all() {
        let store = seeded_store();
        let hikes = store.hikes();
        let first = hikes.get_all().unwrap()[0].id;

        assert_eq!(hikes.delete(first).unwrap(), 1);
        assert_eq!(hikes.delete(first).unwrap(), 0);
        assert_eq!(hikes.get_all().unwrap().len(), 3);

        assert_eq!(hikes.delete_all().unwrap(), 3);
        assert!(hikes.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_delete_cascades_to_observations() {
        let store = Store::open_in_memory().unwrap();
        let hike_id = store.hikes().add(&coast_walk()).unwrap();
        let other_id = store
            .hikes()
            .add(&new_hike("Forest Loop", "Woodland", "9/9/2024", 5.0, Difficulty::Easy))
            .unwrap();
        for (id, text) in [(hike_id, "Gannets"), (hike_id, "Seals"), (other_id, "Owl")] {
            store
                .observations()
                .add(&NewObservation {
                    hike_id: id,
                    observation: text.to_string(),
                    time: None,
                    comments: None,
                })
                .unwrap();
        }

        store.hikes().delete(hike_id).unwrap();

        assert!(store.observations().get_for_hike(hike_id).unwrap().is_empty());
        assert_eq!(store.observations().get_for_hike(other_id).unwrap().len(), 1);

        store.hikes().delete_all().unwrap();
        assert!(store.observations().get_for_hike(other_id).unwrap().is_empty());
    }

    #[test]
    fn test_empty_filter_matches_get_all() {
        let store = seeded_store();
        let hikes = store.hikes();
        assert_eq!(
            hikes.filter(&HikeFilter::default()).unwrap(),
            hikes.get_all().unwrap()
        );
        let blank = HikeFilter::default()
            .name("")
            .location("")
            .date("")
            .difficulty("Any difficulty");
        assert_eq!(hikes.filter(&blank).unwrap(), hikes.get_all().unwrap());
    }

    #[test]
    fn test_name_filter_is_substring_match() {
        let store = seeded_store();
        let found = store.hikes().filter(&HikeFilter::name_search("Ridge")).unwrap();
        assert_eq!(names(&found), vec!["Ridge Trail", "Short Ridge"]);

        let found = store.hikes().filter(&HikeFilter::name_search("ridge")).unwrap();
        assert_eq!(found.len(), 2, "ASCII LIKE matching is case-insensitive");
    }

    #[test]
    fn test_location_and_date_filters() {
        let store = seeded_store();
        let hikes = store.hikes();

        let found = hikes.filter(&HikeFilter::default().location("Park")).unwrap();
        assert_eq!(names(&found), vec!["Forest Loop"]);

        let found = hikes.filter(&HikeFilter::default().date("1/7/2024")).unwrap();
        assert_eq!(names(&found), vec!["Ridge Trail", "Short Ridge"]);

        // Date is exact, not substring
        assert!(hikes.filter(&HikeFilter::default().date("1/7")).unwrap().is_empty());
    }

    #[test]
    fn test_difficulty_filter_is_exact() {
        let store = seeded_store();
        let found = store
            .hikes()
            .filter(&HikeFilter::default().difficulty("Easy"))
            .unwrap();
        assert_eq!(names(&found), vec!["Short Ridge", "Forest Loop"]);
    }

    #[test]
    fn test_length_bounds_are_inclusive() {
        let store = seeded_store();
        let hikes = store.hikes();

        let found = hikes
            .filter(&HikeFilter::default().min_length(5.0).max_length(12.0))
            .unwrap();
        assert_eq!(names(&found), vec!["Coast Walk", "Ridge Trail", "Forest Loop"]);

        let found = hikes.filter(&HikeFilter::default().max_length(5.0)).unwrap();
        assert_eq!(names(&found), vec!["Short Ridge", "Forest Loop"]);
    }

    #[test]
    fn test_adding_criteria_narrows_results() {
        let store = seeded_store();
        let hikes = store.hikes();

        let broad = hikes.filter(&HikeFilter::name_search("Ridge")).unwrap();
        let narrow = hikes
            .filter(&HikeFilter::name_search("Ridge").min_length(5.0))
            .unwrap();

        assert!(narrow.len() <= broad.len());
        assert!(narrow.iter().all(|h| broad.contains(h)));
        assert_eq!(names(&narrow), vec!["Ridge Trail"]);
    }

    #[test]
    fn test_combined_filter() {
        let store = seeded_store();
        let found = store
            .hikes()
            .filter(
                &HikeFilter::default()
                    .name("Ridge")
                    .date("1/7/2024")
                    .difficulty("Easy")
                    .max_length(4.0),
            )
            .unwrap();
        assert_eq!(names(&found), vec!["Short Ridge"]);
    }

    #[test]
    fn test_coast_walk_length_window() {
        let store = seeded_store();
        let hikes = store.hikes();

        let within = hikes
            .filter(&HikeFilter::default().min_length(8.0).max_length(9.0))
            .unwrap();
        assert_eq!(names(&within), vec!["Coast Walk"]);

        let above = hikes.filter(&HikeFilter::default().min_length(9.0)).unwrap();
        assert!(!names(&above).contains(&"Coast Walk"));
    }

    #[test]
    fn test_wildcards_in_search_text_match_literally() {
        let store = Store::open_in_memory().unwrap();
        store
            .hikes()
            .add(&new_hike("100% Uphill", "Alps", "1/1/2024", 7.0, Difficulty::Hard))
            .unwrap();
        store
            .hikes()
            .add(&new_hike("1000 Steps", "Alps", "1/1/2024", 2.0, Difficulty::Medium))
            .unwrap();

        let found = store.hikes().filter(&HikeFilter::name_search("0%")).unwrap();
        assert_eq!(names(&found), vec!["100% Uphill"]);
    }

    #[test]
    fn test_unknown_stored_labels_are_conversion_errors() {
        let store = seeded_store();
        let id = store.hikes().add(&coast_walk()).unwrap();
        store
            .connection()
            .execute("UPDATE hikes SET difficulty = 'Extreme' WHERE id = ?1", [id])
            .unwrap();

        assert!(matches!(store.hikes().get_by_id(id), Err(StoreError::Sqlite(_))));
        assert!(matches!(store.hikes().get_all(), Err(StoreError::Sqlite(_))));

        store
            .connection()
            .execute(
                "UPDATE hikes SET difficulty = 'Easy', parking_available = 'Maybe' WHERE id = ?1",
                [id],
            )
            .unwrap();
        assert!(matches!(store.hikes().get_by_id(id), Err(StoreError::Sqlite(_))));

        // Other rows are still readable
        assert!(store.hikes().get_by_id(1).unwrap().is_some());
    }
}
