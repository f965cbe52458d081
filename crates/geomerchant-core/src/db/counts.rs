//! Running word and phonetic count tables

use std::collections::HashMap;

use rusqlite::params;

use super::Database;
use crate::error::Result;

impl Database {
    /// Add one occurrence per entry (repeats count repeatedly)
    ///
    /// Both tables are updated in a single transaction.
    pub fn increment_counts(&self, words: &[String], phonetics: &[String]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for (table, terms) in [("word_counts", words), ("phonetic_counts", phonetics)] {
            let mut insert =
                tx.prepare(&format!("INSERT OR IGNORE INTO {} (term, frequency) VALUES (?, 0)", table))?;
            let mut increment = tx.prepare(&format!(
                "UPDATE {} SET frequency = frequency + 1 WHERE term = ?",
                table
            ))?;
            for term in terms {
                insert.execute(params![term])?;
                increment.execute(params![term])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn load_word_counts(&self) -> Result<HashMap<String, u64>> {
        self.load_counts("word_counts")
    }

    pub fn load_phonetic_counts(&self) -> Result<HashMap<String, u64>> {
        self.load_counts("phonetic_counts")
    }

    fn load_counts(&self, table: &str) -> Result<HashMap<String, u64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT term, frequency FROM {}", table))?;

        let counts = stmt
            .query_map([], |row| {
                let frequency: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, frequency.max(0) as u64))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;

        Ok(counts)
    }
}
