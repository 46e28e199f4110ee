pub mod config;
pub mod extensions;
pub mod model;
pub mod search;
pub mod service;
pub mod storage;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use config::Config;
use model::types::Dashboard;
use search::query::SearchQuery;
use service::SearchService;
use std::path::PathBuf;
use storage::sqlite::SqliteStorage;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "dsearch",
    version,
    about = "Dashboard search with pluggable sort options"
)]
pub struct Cli {
    /// Path to the config file (defaults to platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database (defaults to platform data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available sort options in display order
    SortOptions {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Search dashboards
    Search {
        /// Title substring (case-insensitive)
        #[arg(default_value = "")]
        query: String,

        /// Sort option name (see `sort-options`)
        #[arg(long)]
        sort: Option<String>,

        /// Require tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Restrict to folder
        #[arg(long)]
        folder: Option<String>,

        /// Max results (defaults to config)
        #[arg(long)]
        limit: Option<usize>,

        /// 1-based page
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        json: bool,
    },
    /// Add or update a dashboard
    Add {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        folder: Option<String>,

        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long, default_value_t = 0)]
        views: i64,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::SortOptions { json } => {
            let service = SearchService::from_config(config);
            print_sort_options(&service, json)
        }
        Commands::Search {
            query,
            sort,
            tags,
            folder,
            limit,
            page,
            json,
        } => {
            let db_path = config.resolve_db_path(cli.db);
            let storage = SqliteStorage::open(&db_path)?;
            let limit = limit.unwrap_or(config.search.default_limit);
            let service = SearchService::from_config(config);
            let query = SearchQuery {
                query,
                tags,
                folder,
                sort,
                limit,
                page,
            };
            let hits = service.search(&storage, &query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                for hit in &hits {
                    let meta = match (&hit.sort_meta_name, hit.sort_meta) {
                        (Some(name), Some(value)) => format!("  [{name}: {value}]"),
                        _ => String::new(),
                    };
                    println!(
                        "{}\t{}\t{}{}",
                        hit.uid,
                        hit.folder.as_deref().unwrap_or("-"),
                        hit.title,
                        meta
                    );
                }
            }
            Ok(())
        }
        Commands::Add {
            uid,
            title,
            folder,
            tags,
            views,
        } => {
            let db_path = config.resolve_db_path(cli.db);
            let mut storage = SqliteStorage::open(&db_path)?;
            let mut dashboard = Dashboard::new(uid, title).with_tags(tags).with_views(views);
            dashboard.folder = folder;
            let id = storage
                .insert_dashboard(&dashboard)
                .with_context(|| format!("storing dashboard {}", dashboard.uid))?;
            println!("{id}");
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "dsearch", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn print_sort_options(service: &SearchService, json: bool) -> Result<()> {
    let options = service.sort_options();
    if json {
        let views: Vec<_> = options.iter().map(|o| o.view()).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    for option in &options {
        println!(
            "{:<14} {:<24} {}",
            option.name, option.display_name, option.description
        );
    }
    Ok(())
}

pub(crate) fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "dashboard-search", "dashboard-search")
}

pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_db_path() -> PathBuf {
    default_data_dir().join("dashboards.db")
}
