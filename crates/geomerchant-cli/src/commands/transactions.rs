//! Transaction command implementations

use anyhow::Result;
use geomerchant_core::db::Database;

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: i64, json: bool) -> Result<()> {
    let rows = db.list_resolved(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  geomerchant import --file transactions.csv");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────────────────────");

    for row in rows {
        let amount_str = if row.amount < 0.0 {
            format!("\x1b[31m${:.2}\x1b[0m", row.amount.abs()) // Red for expenses
        } else {
            format!("\x1b[32m+${:.2}\x1b[0m", row.amount) // Green for income
        };

        let place = if !row.resolved {
            "(unresolved)".to_string()
        } else {
            match (&row.place_name, &row.company_type) {
                (Some(name), _) => name.clone(),
                (None, Some(kind)) => format!("[{}]", kind),
                (None, None) => "-".to_string(),
            }
        };

        println!(
            "   {} │ {:>10} │ {:<30} │ {:<16} │ {}",
            row.date,
            amount_str,
            truncate(&row.description, 30),
            truncate(row.general_name.as_deref().unwrap_or("-"), 16),
            truncate(&place, 30)
        );
    }

    Ok(())
}
