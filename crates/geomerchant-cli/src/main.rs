//! Geomerchant CLI - Merchant name extraction and place matching
//!
//! Usage:
//!   geomerchant init                        Initialize database
//!   geomerchant import --file CSV           Import transactions
//!   geomerchant locations import --file CSV Import visited locations
//!   geomerchant run                         Parse, cluster and resolve

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file)
        }
        Commands::Locations { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                LocationsAction::Import { file } => commands::cmd_locations_import(&db, &file),
                LocationsAction::List { date, limit } => {
                    let date = date.as_deref().map(commands::parse_date_arg).transpose()?;
                    commands::cmd_locations_list(&db, date, limit)
                }
            }
        }
        Commands::Companies { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(CompaniesAction::List) => commands::cmd_companies_list(&db),
                Some(CompaniesAction::Add {
                    name,
                    company,
                    company_type,
                }) => commands::cmd_companies_add(&db, &name, company.as_deref(), &company_type),
                Some(CompaniesAction::Import { file }) => {
                    commands::cmd_companies_import(&db, &file)
                }
            }
        }
        Commands::Parse => {
            let pipeline = commands::open_pipeline(&cli.db, config_path, cli.no_encrypt)?;
            commands::cmd_parse(&pipeline)
        }
        Commands::Cluster => {
            let pipeline = commands::open_pipeline(&cli.db, config_path, cli.no_encrypt)?;
            commands::cmd_cluster(&pipeline)
        }
        Commands::Resolve => {
            let pipeline = commands::open_pipeline(&cli.db, config_path, cli.no_encrypt)?;
            let search = commands::place_search(&pipeline)?;
            commands::cmd_resolve(&pipeline, &search).await
        }
        Commands::Run => {
            let pipeline = commands::open_pipeline(&cli.db, config_path, cli.no_encrypt)?;
            let search = commands::place_search(&pipeline)?;
            commands::cmd_run(&pipeline, &search).await
        }
        Commands::Explain { description, json } => {
            let pipeline = commands::open_pipeline(&cli.db, config_path, cli.no_encrypt)?;
            commands::cmd_explain(&pipeline, &description, json)
        }
        Commands::Transactions { limit, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_transactions_list(&db, limit, json)
        }
        Commands::Status => commands::cmd_status(&cli.db, config_path, cli.no_encrypt),
    }
}
