//! Transaction import command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use geomerchant_core::{db::Database, import::parse_transactions};

pub fn cmd_import(db: &Database, file: &Path) -> Result<()> {
    println!("📥 Importing transactions from {}...", file.display());

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let transactions = parse_transactions(csv_file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!("   Found {} transactions", transactions.len());

    let mut imported = 0;
    let mut skipped = 0;

    for tx in &transactions {
        match db.insert_transaction(tx)? {
            Some(_) => imported += 1,
            None => skipped += 1,
        }
    }

    println!("✅ Import complete!");
    println!("   Imported: {}", imported);
    println!("   Skipped (duplicates): {}", skipped);

    if imported > 0 {
        println!();
        println!("💡 Run 'geomerchant run' to match the new transactions to places.");
    }

    Ok(())
}
