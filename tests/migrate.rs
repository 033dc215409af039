use anyhow::Result;
use catalog_lib::migrate::{apply_migrations, migration_names};
use tempfile::tempdir;

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn migrations_are_idempotent() -> Result<()> {
    let pool = util::temp_pool().await;
    apply_migrations(&pool).await?;
    apply_migrations(&pool).await?;

    let versions: Vec<String> = sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(&pool)
        .await?;
    assert_eq!(versions, migration_names());
    Ok(())
}

#[tokio::test]
async fn edited_migration_is_refused() -> Result<()> {
    let pool = util::temp_pool().await;
    sqlx::query("UPDATE schema_migrations SET checksum = 'tampered'")
        .execute(&pool)
        .await?;

    let err = apply_migrations(&pool).await.unwrap_err();
    assert!(err.to_string().contains("edited after application"));
    Ok(())
}

#[tokio::test]
async fn labels_are_unique_in_store() -> Result<()> {
    let pool = util::temp_pool().await;
    sqlx::query("INSERT INTO categories (id, label, created_at) VALUES ('a', 'FRUIT', 0)")
        .execute(&pool)
        .await?;
    let dup = sqlx::query("INSERT INTO categories (id, label, created_at) VALUES ('b', 'FRUIT', 0)")
        .execute(&pool)
        .await;
    assert!(dup.is_err());
    Ok(())
}

#[tokio::test]
async fn file_store_is_created_with_wal() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("catalog.sqlite3");
    let pool = catalog_lib::db::open_sqlite_pool(&path).await?;
    apply_migrations(&pool).await?;
    assert!(path.exists());

    let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode;").fetch_one(&pool).await?;
    assert_eq!(mode.to_ascii_lowercase(), "wal");
    let (fks,): (i64,) = sqlx::query_as("PRAGMA foreign_keys;").fetch_one(&pool).await?;
    assert_eq!(fks, 1);
    pool.close().await;
    Ok(())
}
