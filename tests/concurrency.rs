use std::path::Path;

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::tempdir;

use catalog_lib::{categories, create_item, delete_item};

#[path = "util.rs"]
mod util;

const WRITERS: usize = 32;

async fn file_pool(dir: &Path) -> Result<SqlitePool> {
    let pool = catalog_lib::db::open_sqlite_pool(&dir.join("catalog.sqlite3")).await?;
    catalog_lib::migrate::apply_migrations(&pool).await?;
    Ok(pool)
}

async fn dangling_items(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM items i LEFT JOIN categories c ON c.id = i.category_id \
         WHERE c.id IS NULL",
    )
    .fetch_one(pool)
    .await?)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_with_new_label_share_one_category() -> Result<()> {
    let dir = tempdir()?;
    let pool = file_pool(dir.path()).await?;

    let mut handles = Vec::with_capacity(WRITERS);
    for i in 0..WRITERS {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            create_item(&pool, &util::item_payload(&format!("item{i}"), "brand new")).await
        }));
    }

    let mut category_ids = Vec::with_capacity(WRITERS);
    for handle in handles {
        let item = handle.await??;
        category_ids.push(item.category);
    }
    category_ids.sort();
    category_ids.dedup();
    assert_eq!(category_ids.len(), 1);

    assert_eq!(util::item_count(&pool).await, WRITERS as i64);
    assert_eq!(util::category_count(&pool).await, 1);
    let listed = categories::list_categories(&pool).await?;
    assert_eq!(listed[0].label, "BRAND NEW");
    pool.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolution_of_new_label_yields_one_category() -> Result<()> {
    let dir = tempdir()?;
    let pool = file_pool(dir.path()).await?;

    let mut handles = Vec::with_capacity(WRITERS);
    for i in 0..WRITERS {
        let pool = pool.clone();
        let label = if i % 2 == 0 { "Garden" } else { " garden " };
        handles.push(tokio::spawn(async move {
            categories::resolve_category(&pool, label).await
        }));
    }

    let mut ids = Vec::with_capacity(WRITERS);
    for handle in handles {
        ids.push(handle.await??.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(util::category_count(&pool).await, 1);
    pool.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn guarded_delete_racing_creates_never_orphans_items() -> Result<()> {
    let dir = tempdir()?;
    let pool = file_pool(dir.path()).await?;

    // Leave an unreferenced category behind so the delete can succeed.
    let first = create_item(&pool, &util::item_payload("seedling", "plants")).await?;
    delete_item(&pool, &first.id).await?;
    let category_id = first.category;

    let deleter = {
        let pool = pool.clone();
        let id = category_id.clone();
        tokio::spawn(async move { categories::delete_category(&pool, &id).await })
    };
    let mut writers = Vec::with_capacity(8);
    for i in 0..8 {
        let pool = pool.clone();
        writers.push(tokio::spawn(async move {
            create_item(&pool, &util::item_payload(&format!("fern{i}"), "plants")).await
        }));
    }

    for writer in writers {
        writer.await??;
    }
    match deleter.await? {
        Ok(removed) => assert_eq!(removed.id, category_id),
        Err(err) => assert_eq!(err.code(), catalog_lib::error::CATEGORY_IN_USE),
    }

    assert_eq!(dangling_items(&pool).await?, 0);
    assert_eq!(util::item_count(&pool).await, 8);
    assert_eq!(util::category_count(&pool).await, 1);
    pool.close().await;
    Ok(())
}

