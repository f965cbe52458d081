//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::{parse_date, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

const TRANSACTION_COLUMNS: &str = "t.id, t.date, t.description, t.amount, t.city, t.state, \
     t.country, t.postcode, t.latitude, t.longitude";

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO transactions (date, description, amount, city, state, country, postcode, latitude, longitude, import_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.date.to_string(),
                tx.description,
                tx.amount,
                tx.city,
                tx.state,
                tx.country,
                tx.postcode,
                tx.latitude,
                tx.longitude,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions t WHERE t.id = ?", TRANSACTION_COLUMNS),
                params![id],
                |row| Self::row_to_transaction(row),
            )
            .optional()?;
        Ok(tx)
    }

    /// Most recent transactions first
    pub fn list_transactions(&self, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions t ORDER BY t.date DESC, t.id DESC LIMIT ?",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![limit], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Transactions without a resolved record, oldest first
    pub fn list_unresolved_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM transactions t
            LEFT JOIN resolved_transactions r ON r.transaction_id = t.id
            WHERE r.transaction_id IS NULL
            ORDER BY t.id
            "#,
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map([], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Distinct descriptions that have no fingerprint yet, in first-seen order
    pub fn list_unparsed_descriptions(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.description
            FROM transactions t
            LEFT JOIN company_fingerprints f ON f.description = t.description
            WHERE f.description IS NULL
            GROUP BY t.description
            ORDER BY MIN(t.id)
            "#,
        )?;

        let descriptions = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(descriptions)
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(1)?;
        Ok(Transaction {
            id: row.get(0)?,
            date: parse_date(&date_str),
            description: row.get(2)?,
            amount: row.get(3)?,
            city: row.get(4)?,
            state: row.get(5)?,
            country: row.get(6)?,
            postcode: row.get(7)?,
            latitude: row.get(8)?,
            longitude: row.get(9)?,
        })
    }
}
