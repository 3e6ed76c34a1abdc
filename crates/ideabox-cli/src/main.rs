//! Ideabox CLI - capture recommendations, project ideas and notes
//!
//! Works against the local store; `ideabox sync` reconciles with the
//! configured sync folders.

mod cli;
mod commands;
mod error;


use clap::{CommandFactory, Parser};
use ideabox_core::config::AppConfig;

use crate::cli::{Cli, Commands};
use crate::commands::add::{run_add, run_quick_note};
use crate::commands::attach::run_attach;
use crate::commands::common::resolve_db_path;
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::search::run_search;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::commands::tags::run_tags;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "ideabox=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let db_path = resolve_db_path(cli.db_path, &config);

    match cli.command {
        Some(Commands::Add { kind }) => run_add(kind, &db_path).await?,
        Some(Commands::List { limit, tag, json }) => {
            run_list(limit, tag.as_deref(), json, &db_path).await?;
        }
        Some(Commands::Search { query, limit, json }) => {
            run_search(&query, limit, json, &db_path).await?;
        }
        Some(Commands::Tags { json }) => run_tags(json, &db_path).await?,
        Some(Commands::Delete { id }) => run_delete(&id, &db_path, &config).await?,
        Some(Commands::Attach { id, file, mime }) => {
            run_attach(&id, &file, mime.as_deref(), &db_path).await?;
        }
        Some(Commands::Sync { json }) => run_sync(json, &db_path, &config).await?,
        Some(Commands::Status { json }) => run_status(json, &db_path, &config).await?,
        None => {
            // Quick capture: ideabox "my thought"
            if cli.note.is_empty() {
                Cli::command().print_help()?;
                println!();
            } else {
                run_quick_note(&cli.note, &db_path).await?;
            }
        }
    }

    Ok(())
}
