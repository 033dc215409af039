use sqlx::{Executor, Sqlite, SqliteConnection};

use crate::{id::new_uuid_v7, model::Category, time::now_ms};

pub async fn find_by_label<'c, E>(exec: E, label: &str) -> Result<Option<Category>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, Category>("SELECT id, label, created_at FROM categories WHERE label = ?")
        .bind(label)
        .fetch_optional(exec)
        .await
}

pub async fn find_by_id<'c, E>(exec: E, id: &str) -> Result<Option<Category>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, Category>("SELECT id, label, created_at FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn list_all<'c, E>(exec: E) -> Result<Vec<Category>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, Category>("SELECT id, label, created_at FROM categories ORDER BY label, id")
        .fetch_all(exec)
        .await
}

/// Insert unless the label is already taken. Returns whether a row was added.
pub async fn insert_if_absent<'c, E>(exec: E, category: &Category) -> Result<bool, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query(
        "INSERT INTO categories (id, label, created_at) VALUES (?, ?, ?) \
         ON CONFLICT(label) DO NOTHING",
    )
    .bind(&category.id)
    .bind(&category.label)
    .bind(category.created_at)
    .execute(exec)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Find the category carrying `label`, creating it when absent.
///
/// The unique index on `label` makes the insert a no-op when another writer
/// got there first, so the second lookup always sees exactly one row.
pub async fn find_or_create(
    conn: &mut SqliteConnection,
    label: &str,
) -> Result<(Category, bool), sqlx::Error> {
    if let Some(existing) = find_by_label(&mut *conn, label).await? {
        return Ok((existing, false));
    }

    let candidate = Category {
        id: new_uuid_v7(),
        label: label.to_string(),
        created_at: now_ms(),
    };
    let created = insert_if_absent(&mut *conn, &candidate).await?;
    if created {
        return Ok((candidate, true));
    }

    let winner = find_by_label(&mut *conn, label)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok((winner, false))
}

pub async fn count_items<'c, E>(exec: E, category_id: &str) -> Result<i64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(exec)
        .await
}

pub async fn delete_by_id<'c, E>(exec: E, id: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}
