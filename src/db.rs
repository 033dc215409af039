use anyhow::{Context, Result as AnyResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{ConnectOptions, Pool, Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::str::FromStr;

use crate::config::StoreTarget;
use crate::AppResult;

/// Open a pool for the configured store target.
pub async fn open_pool(target: &StoreTarget) -> AnyResult<SqlitePool> {
    match target {
        StoreTarget::File(path) => open_sqlite_pool(path).await,
        StoreTarget::Memory => open_memory_pool().await,
    }
}

pub async fn open_sqlite_pool(db_path: &Path) -> AnyResult<Pool<Sqlite>> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            tracing::error!(
                target: "catalog",
                error = %e,
                event = "db_dir_create_failed",
                path = %parent.display()
            );
            e
        })?;
    }
    tracing::info!(target: "catalog", event = "db_path", path = %db_path.display());

    let opts = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full)
        .foreign_keys(true)
        .log_statements(log::LevelFilter::Off);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .after_connect(|conn, _| {
            Box::pin(async move {
                sqlx::query("PRAGMA busy_timeout = 5000;")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA wal_autocheckpoint = 1000;")
                    .execute(&mut *conn)
                    .await?;
                Ok::<_, sqlx::Error>(())
            })
        })
        .connect_with(opts)
        .await
        .with_context(|| format!("open sqlite database {}", db_path.display()))?;

    log_effective_pragmas(&pool).await;

    Ok(pool)
}

/// A private in-memory database. A single connection keeps every caller on
/// the same database for the lifetime of the pool.
pub async fn open_memory_pool() -> AnyResult<Pool<Sqlite>> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?
        .foreign_keys(true)
        .log_statements(log::LevelFilter::Off);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .context("open in-memory sqlite database")?;
    tracing::info!(target: "catalog", event = "db_path", path = "memory");
    Ok(pool)
}

async fn log_effective_pragmas(pool: &Pool<Sqlite>) {
    use tracing::{info, warn};

    let (sqlite_ver,): (String,) = sqlx::query_as("select sqlite_version()")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    let jm: (String,) = sqlx::query_as("PRAGMA journal_mode;")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    let fks: (i64,) = sqlx::query_as("PRAGMA foreign_keys;")
        .fetch_one(pool)
        .await
        .unwrap_or((i64::MIN,));

    let busy: (i64,) = sqlx::query_as("PRAGMA busy_timeout;")
        .fetch_one(pool)
        .await
        .unwrap_or((i64::MIN,));

    info!(
        target: "catalog",
        event = "db_open",
        sqlite_version = %sqlite_ver,
        journal_mode = %jm.0,
        foreign_keys = %fks.0,
        busy_timeout_ms = %busy.0
    );

    if !jm.0.eq_ignore_ascii_case("wal") {
        warn!(
            target: "catalog",
            event = "db_open_warning",
            msg = "journal_mode != WAL; running with reduced crash safety"
        );
    }
}

/// Start a write transaction. Dropping the returned transaction without
/// calling [`commit`] rolls it back.
///
/// The write lock is taken up front so a read inside the transaction can
/// never need an upgrade that fails with `SQLITE_BUSY`; competing writers
/// wait on `busy_timeout` instead.
pub async fn begin(pool: &SqlitePool) -> AppResult<Transaction<'static, Sqlite>> {
    let tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    tracing::debug!(target: "catalog", event = "db_tx_begin");
    Ok(tx)
}

pub async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    if let Err(err) = tx.commit().await {
        tracing::error!(target: "catalog", event = "db_tx_commit_failed", error = %err);
        return Err(err.into());
    }
    tracing::debug!(target: "catalog", event = "db_tx_commit");
    Ok(())
}

/// Roll back explicitly so the outcome shows up in the logs.
pub async fn rollback(tx: Transaction<'static, Sqlite>) {
    if let Err(rb) = tx.rollback().await {
        tracing::error!(target: "catalog", event = "db_tx_rollback_failed", error = %rb);
    } else {
        tracing::warn!(target: "catalog", event = "db_tx_rollback");
    }
}
