//! CSV import parsers
//!
//! Columns are located by header name (case-insensitive), so extra columns
//! and any column order are accepted:
//!
//! - transactions: `Date, Description, Amount, Latitude, Longitude`, plus
//!   optional `City, State, Country, Postcode`
//! - visited locations: `Date, Latitude, Longitude`
//! - predefined companies: `Name, Company, Type`

use std::io::Read;

use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{NewDefinedCompany, NewTransaction, NewVisitedLocation, VisitedLocation};

/// Column positions resolved from a header row
struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    fn optional(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn required(&self, name: &str) -> Result<usize> {
        self.optional(name)
            .ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, row: usize, name: &str) -> Result<&'r str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import(format!("Row {}: missing {}", row, name)))
}

fn optional_field(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

/// Parse a transactions CSV
pub fn parse_transactions<R: Read>(input: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = reader(input);
    let cols = Columns::new(rdr.headers()?);

    let date_col = cols.required("date")?;
    let desc_col = cols.required("description")?;
    let amount_col = cols.required("amount")?;
    let lat_col = cols.required("latitude")?;
    let lng_col = cols.required("longitude")?;
    let city_col = cols.optional("city");
    let state_col = cols.optional("state");
    let country_col = cols.optional("country");
    let postcode_col = cols.optional("postcode");

    let mut transactions = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let date = parse_date(field(&record, date_col, row, "date")?)?;
        let description = field(&record, desc_col, row, "description")?.to_string();
        let amount = parse_amount(field(&record, amount_col, row, "amount")?)?;
        let (latitude, longitude) = parse_coordinates(
            field(&record, lat_col, row, "latitude")?,
            field(&record, lng_col, row, "longitude")?,
            row,
        )?;

        let import_hash = generate_hash(&date, &description, amount, latitude, longitude);

        transactions.push(NewTransaction {
            date,
            description,
            amount,
            city: optional_field(&record, city_col),
            state: optional_field(&record, state_col),
            country: optional_field(&record, country_col),
            postcode: optional_field(&record, postcode_col),
            latitude,
            longitude,
            import_hash,
        });
    }

    debug!("Parsed {} transactions", transactions.len());
    Ok(transactions)
}

/// Parse a visited-locations CSV
///
/// A date-time in the date column keeps only its date.
pub fn parse_visited_locations<R: Read>(input: R) -> Result<Vec<NewVisitedLocation>> {
    let mut rdr = reader(input);
    let cols = Columns::new(rdr.headers()?);

    let date_col = cols.required("date")?;
    let lat_col = cols.required("latitude")?;
    let lng_col = cols.required("longitude")?;

    let mut visits = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let raw_date = field(&record, date_col, row, "date")?;
        let date_part = raw_date
            .split(['T', ' '])
            .next()
            .unwrap_or(raw_date);
        let date = parse_date(date_part)?;
        let (lat, lng) = parse_coordinates(
            field(&record, lat_col, row, "latitude")?,
            field(&record, lng_col, row, "longitude")?,
            row,
        )?;

        visits.push(NewVisitedLocation {
            date,
            location: VisitedLocation::new(lat, lng),
        });
    }

    debug!("Parsed {} visited locations", visits.len());
    Ok(visits)
}

/// Parse a predefined-companies CSV
pub fn parse_defined_companies<R: Read>(input: R) -> Result<Vec<NewDefinedCompany>> {
    let mut rdr = reader(input);
    let cols = Columns::new(rdr.headers()?);

    let name_col = cols.required("name")?;
    let company_col = cols.required("company")?;
    let type_col = cols.required("type")?;

    let mut companies = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;

        companies.push(NewDefinedCompany {
            name: field(&record, name_col, row, "name")?.to_lowercase(),
            company: field(&record, company_col, row, "company")?.to_string(),
            company_type: field(&record, type_col, row, "type")?.to_string(),
        });
    }

    debug!("Parsed {} defined companies", companies.len());
    Ok(companies)
}

fn generate_hash(
    date: &NaiveDate,
    description: &str,
    amount: f64,
    latitude: f64,
    longitude: f64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(latitude.to_be_bytes());
    hasher.update(longitude.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a date string in various common formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            // "%Y" also accepts two-digit years; leave those to "%y"
            if date.year() >= 1000 {
                return Ok(date);
            }
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}

fn parse_coordinates(lat: &str, lng: &str, row: usize) -> Result<(f64, f64)> {
    let parse = |s: &str, name: &str| {
        s.parse::<f64>()
            .map_err(|_| Error::Import(format!("Row {}: invalid {}: {}", row, name, s)))
    };
    let (lat, lng) = (parse(lat, "latitude")?, parse(lng, "longitude")?);

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(Error::Import(format!(
            "Row {}: coordinates out of range: {}, {}",
            row, lat, lng
        )));
    }
    Ok((lat, lng))
}
