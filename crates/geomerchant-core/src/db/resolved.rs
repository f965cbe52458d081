//! Resolved transaction records and reporting queries

use rusqlite::{params, OptionalExtension};

use super::{parse_date, Database};
use crate::error::Result;
use crate::models::{DatabaseStats, ResolvedRecord, ResolvedTransaction};

impl Database {
    /// Write a resolved record unless the transaction already has one
    ///
    /// Returns true if a row was written.
    pub fn insert_resolved(&self, record: &ResolvedRecord) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO resolved_transactions
                (transaction_id, place_name, company_type, address, place_id, latitude, longitude)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.transaction_id,
                record.place_name,
                record.company_type,
                record.address,
                record.place_id,
                record.lat,
                record.lng,
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_resolved(&self, transaction_id: i64) -> Result<Option<ResolvedRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                r#"
                SELECT transaction_id, place_name, company_type, address, place_id, latitude, longitude
                FROM resolved_transactions WHERE transaction_id = ?
                "#,
                params![transaction_id],
                |row| {
                    Ok(ResolvedRecord {
                        transaction_id: row.get(0)?,
                        place_name: row.get(1)?,
                        company_type: row.get(2)?,
                        address: row.get(3)?,
                        place_id: row.get(4)?,
                        lat: row.get(5)?,
                        lng: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Transactions joined with their predicted, general and resolved names
    pub fn list_resolved(&self, limit: i64) -> Result<Vec<ResolvedTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.date, t.description, t.amount,
                   f.predicted_name, g.general_name,
                   r.place_name, r.company_type, r.address,
                   r.transaction_id IS NOT NULL
            FROM transactions t
            LEFT JOIN company_fingerprints f ON f.description = t.description
            LEFT JOIN general_names g ON g.description = t.description
            LEFT JOIN resolved_transactions r ON r.transaction_id = t.id
            ORDER BY t.date DESC, t.id DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                let date_str: String = row.get(1)?;
                Ok(ResolvedTransaction {
                    transaction_id: row.get(0)?,
                    date: parse_date(&date_str),
                    description: row.get(2)?,
                    amount: row.get(3)?,
                    predicted_name: row.get(4)?,
                    general_name: row.get(5)?,
                    place_name: row.get(6)?,
                    company_type: row.get(7)?,
                    address: row.get(8)?,
                    resolved: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Row counts across every table
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?)
        };

        Ok(DatabaseStats {
            transactions: count("transactions")?,
            visited_locations: count("visited_locations")?,
            defined_companies: count("defined_companies")?,
            distinct_words: count("word_counts")?,
            distinct_phonetics: count("phonetic_counts")?,
            fingerprints: count("company_fingerprints")?,
            general_names: count("general_names")?,
            resolved: count("resolved_transactions")?,
        })
    }
}
