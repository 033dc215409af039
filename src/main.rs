use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;

use catalog_lib::config::{Config, ENV_CONTEXT, ENV_DB, ENV_TEST_DB};
use catalog_lib::{categories, db, http, items, logging, migrate, seed, AppError, AppResult};

#[derive(Debug, Parser)]
#[command(name = "catalog", about = "Inventory catalog service", version)]
struct Cli {
    /// Explicit database path
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Execution environment (production or test)
    #[arg(long, value_name = "NAME", global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the REST API until interrupted.
    Serve {
        #[arg(long, value_name = "ADDR")]
        addr: Option<SocketAddr>,
    },
    /// Apply pending schema migrations.
    Migrate,
    /// Insert the starter items into an empty catalog.
    Seed,
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Items(ItemCommand),
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    /// List categories by label.
    List,
    /// Delete a category that no item references.
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum ItemCommand {
    /// List item summaries, optionally within one category.
    List {
        #[arg(long, value_name = "ID")]
        category: Option<String>,
    },
    Get {
        id: String,
    },
    /// Create an item from a JSON object.
    Create {
        #[arg(value_name = "JSON")]
        data: String,
    },
    /// Replace an item's fields from a JSON object.
    Update {
        id: String,
        #[arg(value_name = "JSON")]
        data: String,
    },
    Delete {
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.env.is_none() && cli.db.is_none() {
        return Config::from_env().context("load configuration");
    }
    let mut vars: HashMap<String, String> = std::env::vars().collect();
    if let Some(env) = &cli.env {
        vars.insert(ENV_CONTEXT.to_string(), env.clone());
    }
    if let Some(path) = &cli.db {
        let path = path.to_string_lossy().into_owned();
        vars.insert(ENV_DB.to_string(), path.clone());
        vars.insert(ENV_TEST_DB.to_string(), path);
    }
    Config::from_vars(&vars).context("load configuration")
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;
    let _log_guard = logging::init(config.log_dir.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;

    runtime.block_on(async move {
        let pool = db::open_pool(&config.store).await?;
        migrate::apply_migrations(&pool)
            .await
            .context("apply migrations")?;
        let code = dispatch(cli.command, &config, &pool).await?;
        pool.close().await;
        Ok::<_, anyhow::Error>(code)
    })
}

async fn dispatch(command: Commands, config: &Config, pool: &SqlitePool) -> Result<i32> {
    match command {
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or(config.listen_addr);
            http::serve(addr, pool.clone()).await?;
            Ok(0)
        }
        Commands::Migrate => print_json(&json!({ "migrations": migrate::migration_names() })),
        Commands::Seed => report(seed::seed_defaults(pool).await.map(|n| json!({ "inserted": n }))),
        Commands::Categories(CategoryCommand::List) => {
            report(categories::list_categories(pool).await)
        }
        Commands::Categories(CategoryCommand::Delete { id }) => {
            report(categories::delete_category(pool, &id).await)
        }
        Commands::Items(command) => run_item_command(command, pool).await,
    }
}

async fn run_item_command(command: ItemCommand, pool: &SqlitePool) -> Result<i32> {
    match command {
        ItemCommand::List { category } => {
            report(items::list_items_vec(pool, category.as_deref()).await)
        }
        ItemCommand::Get { id } => report(items::get_item(pool, &id).await),
        ItemCommand::Create { data } => match parse_fields(&data) {
            Ok(fields) => report(items::create_item(pool, &fields).await),
            Err(err) => report::<()>(Err(err)),
        },
        ItemCommand::Update { id, data } => match parse_fields(&data) {
            Ok(fields) => report(items::update_item(pool, &id, &fields).await),
            Err(err) => report::<()>(Err(err)),
        },
        ItemCommand::Delete { id } => report(items::delete_item(pool, &id).await),
    }
}

/// Item data must be a JSON object.
fn parse_fields(raw: &str) -> AppResult<Map<String, Value>> {
    serde_json::from_str(raw).map_err(|err| AppError::from(err).with_context("operation", "parse"))
}

fn print_json<T: Serialize>(value: &T) -> Result<i32> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(0)
}

fn report<T: Serialize>(outcome: AppResult<T>) -> Result<i32> {
    match outcome {
        Ok(value) => print_json(&value),
        Err(err) => {
            print_app_error(&err)?;
            Ok(1)
        }
    }
}

fn print_app_error(err: &AppError) -> Result<()> {
    eprintln!("{}", serde_json::to_string_pretty(err)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn db_flag_targets_both_contexts() {
        let cli = Cli::parse_from(["catalog", "--db", "/tmp/x.db", "--env", "test", "migrate"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.store, catalog_lib::config::StoreTarget::File(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn malformed_item_data_is_a_json_error() {
        let err = parse_fields("{\"name\": }").unwrap_err();
        assert_eq!(err.code(), "JSON/SYNTAX");
        assert!(err.context().contains_key("line"));

        let err = parse_fields("[1, 2]").unwrap_err();
        assert_eq!(err.code(), "JSON/DATA");
    }
}
