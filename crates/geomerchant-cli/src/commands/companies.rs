//! Predefined company command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use geomerchant_core::{db::Database, import::parse_defined_companies};

pub fn cmd_companies_list(db: &Database) -> Result<()> {
    let companies = db.list_defined_companies()?;

    if companies.is_empty() {
        println!("No predefined companies. Add one with:");
        println!("  geomerchant companies add walmart --type department_store");
        return Ok(());
    }

    println!();
    println!("🏢 Predefined Companies");
    println!("   ─────────────────────────────────────────────────────────────");

    for c in companies {
        println!("   {:<20} │ {:<25} │ {}", c.name, c.company, c.company_type);
    }

    Ok(())
}

pub fn cmd_companies_add(
    db: &Database,
    name: &str,
    company: Option<&str>,
    company_type: &str,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Company name cannot be empty");
    }
    if company_type.trim().is_empty() {
        anyhow::bail!("Company type cannot be empty");
    }

    let company = company.unwrap_or(name);
    let id = db.upsert_defined_company(name, company, company_type.trim())?;

    println!(
        "✅ Saved company '{}' as {} (id: {})",
        name.to_lowercase(),
        company_type.trim(),
        id
    );
    Ok(())
}

pub fn cmd_companies_import(db: &Database, file: &Path) -> Result<()> {
    println!("🏢 Importing predefined companies from {}...", file.display());

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let companies = parse_defined_companies(csv_file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    for c in &companies {
        db.upsert_defined_company(&c.name, &c.company, &c.company_type)?;
    }

    println!("✅ Imported {} companies", companies.len());
    Ok(())
}
