#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use serde_json::{json, Map, Value};
use sqlx::SqlitePool;

/// Migrated single-connection in-memory store.
pub async fn temp_pool() -> SqlitePool {
    let pool = catalog_lib::db::open_memory_pool()
        .await
        .expect("connect sqlite::memory:");
    catalog_lib::migrate::apply_migrations(&pool)
        .await
        .expect("apply migrations");
    pool
}

pub fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// A valid item payload with the given name and category label.
pub fn item_payload(name: &str, category: &str) -> Map<String, Value> {
    fields(json!({
        "name": name,
        "description": format!("{name} description"),
        "price": 4.5,
        "imageURL": format!("https://example.com/{}.jpg", name.replace(' ', "_")),
        "category": category,
    }))
}

pub async fn category_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn item_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await
        .unwrap()
}
