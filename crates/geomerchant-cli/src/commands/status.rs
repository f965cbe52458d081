//! Status command implementation

use std::path::Path;

use anyhow::Result;
use geomerchant_core::config::default_config_path;

use super::open_db;

pub fn cmd_status(db_path: &Path, config_path: Option<&Path>, no_encrypt: bool) -> Result<()> {
    use geomerchant_core::db::DB_KEY_ENV;
    use std::fs;

    println!();
    println!("📊 Geomerchant Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Check encryption status
    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    // Config source
    match config_path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) if p.exists() => println!("   Config: {}", p.display()),
        _ => println!("   Config: (built-in defaults)"),
    }

    // Place search backend
    let backend = std::env::var("PLACE_SEARCH_BACKEND").unwrap_or_else(|_| "google".to_string());
    let has_api_key = std::env::var("GOOGLE_PLACES_API_KEY").is_ok();
    if backend == "mock" {
        println!("   Place search: mock");
    } else if has_api_key {
        println!("   Place search: google (GOOGLE_PLACES_API_KEY=***)");
    } else {
        println!("   Place search: google, but GOOGLE_PLACES_API_KEY not set");
    }

    // Try to open the database and show stats
    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                if let Ok(stats) = db.get_stats() {
                    println!();
                    println!("   Transactions: {}", stats.transactions);
                    println!("   Visited locations: {}", stats.visited_locations);
                    println!("   Predefined companies: {}", stats.defined_companies);
                    println!(
                        "   Distinct tokens: {} ({} phonetic codes)",
                        stats.distinct_words, stats.distinct_phonetics
                    );
                    println!("   Predicted names: {}", stats.fingerprints);
                    println!("   General names: {}", stats.general_names);
                    println!("   Resolved: {}", stats.resolved);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}
