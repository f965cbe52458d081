//! Visited location operations

use chrono::NaiveDate;
use rusqlite::params;

use super::{parse_date, Database};
use crate::error::Result;
use crate::models::{NewVisitedLocation, VisitedLocation};

impl Database {
    /// Record a visited location; returns false if it was already known
    pub fn insert_visited_location(&self, visit: &NewVisitedLocation) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO visited_locations (date, latitude, longitude) VALUES (?, ?, ?)",
            params![visit.date.to_string(), visit.location.lat, visit.location.lng],
        )?;
        Ok(inserted > 0)
    }

    /// Every point visited on a calendar day
    pub fn visited_locations_on(&self, date: NaiveDate) -> Result<Vec<VisitedLocation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT latitude, longitude FROM visited_locations WHERE date = ? ORDER BY id",
        )?;

        let locations = stmt
            .query_map(params![date.to_string()], |row| {
                Ok(VisitedLocation::new(row.get(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(locations)
    }

    /// All visited locations, most recent day first
    pub fn list_visited_locations(&self, limit: i64) -> Result<Vec<NewVisitedLocation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date, latitude, longitude FROM visited_locations
             ORDER BY date DESC, id LIMIT ?",
        )?;

        let visits = stmt
            .query_map(params![limit], |row| {
                let date_str: String = row.get(0)?;
                Ok(NewVisitedLocation {
                    date: parse_date(&date_str),
                    location: VisitedLocation::new(row.get(1)?, row.get(2)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(visits)
    }
}
