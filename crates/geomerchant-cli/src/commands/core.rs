//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `open_pipeline` - Database plus engine config and oracles
//! - `place_search` - Place search client from the environment
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use geomerchant_core::{db::Database, EngineConfig, MerchantPipeline, PlaceSearchClient};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load the engine config (explicit path, override file, or built-in defaults)
pub fn load_config(config_path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(config_path).context("Failed to load engine config")
}

/// Open the database and build the pipeline over it
pub fn open_pipeline(
    db_path: &Path,
    config_path: Option<&Path>,
    no_encrypt: bool,
) -> Result<MerchantPipeline> {
    let db = open_db(db_path, no_encrypt)?;
    let config = load_config(config_path)?;
    MerchantPipeline::from_config(db, config).context("Failed to load word list")
}

/// Build the place search client configured by the environment
pub fn place_search(pipeline: &MerchantPipeline) -> Result<PlaceSearchClient> {
    PlaceSearchClient::from_env(&pipeline.config().place_search)
        .context("Failed to create place search client")?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No place search backend configured.\n\
                 Set GOOGLE_PLACES_API_KEY, or PLACE_SEARCH_BACKEND=mock for offline runs"
            )
        })
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database...");

    let db = open_db(db_path, no_encrypt)?;
    println!("   Path: {}", db.path());

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: geomerchant import --file transactions.csv");
    println!("  2. Import visited locations: geomerchant locations import --file visits.csv");
    println!("  3. Match them to places: geomerchant run");

    Ok(())
}
