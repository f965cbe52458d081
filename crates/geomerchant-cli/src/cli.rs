//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Geomerchant - Find out where your card was used
#[derive(Parser)]
#[command(name = "geomerchant")]
#[command(
    about = "Extract merchant names from transaction descriptions and match them to places",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "geomerchant.db", global = true)]
    pub db: PathBuf,

    /// Engine config file (defaults to ~/.local/share/geomerchant/config.toml,
    /// then the built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set GEOMERCHANT_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import transactions from CSV
    ///
    /// Required columns: Date, Description, Amount, Latitude, Longitude.
    /// Optional: City, State, Country, Postcode.
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Manage visited locations (import, list)
    Locations {
        #[command(subcommand)]
        action: LocationsAction,
    },

    /// Manage predefined companies (list, add, import)
    Companies {
        #[command(subcommand)]
        action: Option<CompaniesAction>,
    },

    /// Extract company names from descriptions not yet parsed
    Parse,

    /// Group predicted names under general names
    Cluster,

    /// Match unresolved transactions to places
    ///
    /// Uses PLACE_SEARCH_BACKEND (google, mock) and GOOGLE_PLACES_API_KEY.
    Resolve,

    /// Run parse, cluster and resolve in order
    Run,

    /// Show how a description is scored, token by token
    Explain {
        /// Transaction description
        description: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transactions with their predicted names and places
    Transactions {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show database status (encryption, size, row counts)
    Status,
}

#[derive(Subcommand)]
pub enum LocationsAction {
    /// Import visited locations from CSV (Date, Latitude, Longitude)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List visited locations
    List {
        /// Only this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Number of locations to show
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum CompaniesAction {
    /// List predefined companies
    List,

    /// Add or update a predefined company
    Add {
        /// Name matched inside predicted company names
        name: String,

        /// Proper company name
        #[arg(short, long)]
        company: Option<String>,

        /// Category assigned to matching transactions
        #[arg(short = 't', long = "type")]
        company_type: String,
    },

    /// Import predefined companies from CSV (Name, Company, Type)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },
}
