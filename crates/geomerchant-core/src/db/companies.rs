//! Predefined companies, fingerprints and general names

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::{CompanyFingerprint, DefinedCompany, GeneralName};

impl Database {
    /// Add or update a predefined company, returning its ID
    pub fn upsert_defined_company(
        &self,
        name: &str,
        company: &str,
        company_type: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let name = name.trim().to_lowercase();

        conn.execute(
            r#"
            INSERT INTO defined_companies (name, company, company_type)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                company = excluded.company,
                company_type = excluded.company_type
            "#,
            params![name, company, company_type],
        )?;

        let id = conn.query_row(
            "SELECT id FROM defined_companies WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// All predefined companies in table order
    pub fn list_defined_companies(&self) -> Result<Vec<DefinedCompany>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, company, company_type FROM defined_companies ORDER BY id",
        )?;

        let companies = stmt
            .query_map([], |row| {
                Ok(DefinedCompany {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    company: row.get(2)?,
                    company_type: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(companies)
    }

    /// Insert or replace the fingerprint for its description
    pub fn upsert_fingerprint(&self, fp: &CompanyFingerprint) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO company_fingerprints
                (description, predicted_name, phonetic1, phonetic2, first_letter, letter_set)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                fp.description,
                fp.predicted_name,
                fp.phonetic_primary,
                fp.phonetic_alternate,
                fp.first_letter.map(|c| c.to_string()),
                fp.letter_set_string(),
            ],
        )?;
        Ok(())
    }

    pub fn get_fingerprint(&self, description: &str) -> Result<Option<CompanyFingerprint>> {
        let conn = self.conn()?;
        let fp = conn
            .query_row(
                r#"
                SELECT description, predicted_name, phonetic1, phonetic2, first_letter, letter_set
                FROM company_fingerprints WHERE description = ?
                "#,
                params![description],
                |row| Self::row_to_fingerprint(row),
            )
            .optional()?;
        Ok(fp)
    }

    /// The whole fingerprint population, ordered by description
    pub fn list_fingerprints(&self) -> Result<Vec<CompanyFingerprint>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT description, predicted_name, phonetic1, phonetic2, first_letter, letter_set
            FROM company_fingerprints
            ORDER BY description
            "#,
        )?;

        let fingerprints = stmt
            .query_map([], |row| Self::row_to_fingerprint(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(fingerprints)
    }

    /// Insert or replace the general name for a fingerprint
    pub fn upsert_general_name(&self, name: &GeneralName) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO general_names (description, general_name) VALUES (?, ?)",
            params![name.description, name.general_name],
        )?;
        Ok(())
    }

    pub fn get_general_name(&self, description: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let name = conn
            .query_row(
                "SELECT general_name FROM general_names WHERE description = ?",
                params![description],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    fn row_to_fingerprint(row: &rusqlite::Row) -> rusqlite::Result<CompanyFingerprint> {
        let first_letter: Option<String> = row.get(4)?;
        let letter_set: String = row.get(5)?;
        Ok(CompanyFingerprint {
            description: row.get(0)?,
            predicted_name: row.get(1)?,
            phonetic_primary: row.get(2)?,
            phonetic_alternate: row.get(3)?,
            first_letter: first_letter.and_then(|s| s.chars().next()),
            letter_set: CompanyFingerprint::parse_letter_set(&letter_set),
        })
    }
}
