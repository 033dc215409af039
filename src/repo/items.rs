use futures::stream::BoxStream;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::model::{Item, ItemDetail, ItemFields, ItemSummary};

const ITEM_COLUMNS: &str =
    "id, name, description, price, image_url, category_id, created_at, updated_at";

pub async fn insert<'c, E>(exec: E, item: &Item) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO items (id, name, description, price, image_url, category_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&item.id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.image_url)
    .bind(&item.category)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Overwrite every writable field of an item. Returns the number of rows hit.
pub async fn replace<'c, E>(
    exec: E,
    id: &str,
    fields: &ItemFields,
    category_id: &str,
    updated_at: i64,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query(
        "UPDATE items SET name = ?, description = ?, price = ?, image_url = ?, \
         category_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.price)
    .bind(&fields.image_url)
    .bind(category_id)
    .bind(updated_at)
    .bind(id)
    .execute(exec)
    .await?;
    Ok(res.rows_affected())
}

pub async fn find<'c, E>(exec: E, id: &str) -> Result<Option<Item>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?");
    sqlx::query_as::<_, Item>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn find_detail<'c, E>(exec: E, id: &str) -> Result<Option<ItemDetail>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, ItemDetail>(
        "SELECT i.id, i.name, i.description, i.price, i.image_url, i.created_at, i.updated_at, \
                c.id AS category_id, c.label AS category_label, c.created_at AS category_created_at \
         FROM items i JOIN categories c ON c.id = i.category_id \
         WHERE i.id = ?",
    )
    .bind(id)
    .fetch_optional(exec)
    .await
}

pub async fn delete_by_id<'c, E>(exec: E, id: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

pub async fn count<'c, E>(exec: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(exec)
        .await
}

/// Lazily stream list projections ordered by name. A `None` filter matches
/// every item.
pub fn stream_summaries(
    pool: &SqlitePool,
    category_id: Option<String>,
) -> BoxStream<'_, Result<ItemSummary, sqlx::Error>> {
    sqlx::query_as::<_, ItemSummary>(
        "SELECT id, name, image_url FROM items \
         WHERE (?1 IS NULL OR category_id = ?1) \
         ORDER BY name, id",
    )
    .bind(category_id)
    .fetch(pool)
}
