//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `companies` - Predefined company commands (list, add, import)
//! - `core` - Init and shared utilities (open_db, open_pipeline, place_search)
//! - `import` - Transaction CSV import
//! - `locations` - Visited location commands (import, list)
//! - `pipeline` - Parse, cluster, resolve, run and explain
//! - `status` - Status command
//! - `transactions` - Transaction listing

pub mod companies;
pub mod core;
pub mod import;
pub mod locations;
pub mod pipeline;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use companies::*;
pub use core::*;
pub use import::*;
pub use locations::*;
pub use pipeline::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
