//! Visited location command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use geomerchant_core::{db::Database, import::parse_visited_locations, models::NewVisitedLocation};

pub fn cmd_locations_import(db: &Database, file: &Path) -> Result<()> {
    println!("📍 Importing visited locations from {}...", file.display());

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let visits = parse_visited_locations(csv_file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let mut imported = 0;
    for visit in &visits {
        if db.insert_visited_location(visit)? {
            imported += 1;
        }
    }

    println!("✅ Import complete!");
    println!("   Imported: {}", imported);
    println!("   Skipped (duplicates): {}", visits.len() - imported);

    Ok(())
}

pub fn cmd_locations_list(db: &Database, date: Option<NaiveDate>, limit: i64) -> Result<()> {
    let visits: Vec<NewVisitedLocation> = match date {
        Some(date) => db
            .visited_locations_on(date)?
            .into_iter()
            .map(|location| NewVisitedLocation { date, location })
            .collect(),
        None => db.list_visited_locations(limit)?,
    };

    if visits.is_empty() {
        println!("No visited locations found. Import some with:");
        println!("  geomerchant locations import --file visits.csv");
        return Ok(());
    }

    println!();
    println!("📍 Visited Locations");
    println!("   ─────────────────────────────────────────");

    for visit in visits {
        println!(
            "   {} │ {:>10.5} │ {:>11.5}",
            visit.date, visit.location.lat, visit.location.lng
        );
    }

    Ok(())
}
