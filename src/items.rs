//! Item write and read paths.
//!
//! Writes always validate first, then resolve the category label and persist
//! in one transaction. Nothing touches the store when validation fails.

use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    categories::resolve_with,
    db,
    id::{new_uuid_v7, parse_record_id},
    model::{Item, ItemDetail, ItemSummary},
    repo::{self, CATEGORIES_TABLE, ITEMS_TABLE},
    time::now_ms,
    validate::validate_item,
    AppError, AppResult,
};

fn store_error(err: sqlx::Error, operation: &'static str) -> AppError {
    AppError::from(err)
        .with_context("operation", operation)
        .with_context("table", ITEMS_TABLE)
}

/// Validate `input`, resolve its category, and store a new item.
pub async fn create_item(pool: &SqlitePool, input: &Map<String, Value>) -> AppResult<Item> {
    let fields = validate_item(input).map_err(AppError::from)?;

    let mut tx = db::begin(pool).await?;
    let written = async {
        let category = resolve_with(&mut tx, &fields.category).await?;
        let now = now_ms();
        let item = Item {
            id: new_uuid_v7(),
            name: fields.name.clone(),
            description: fields.description.clone(),
            price: fields.price,
            image_url: fields.image_url.clone(),
            category: category.id,
            created_at: now,
            updated_at: now,
        };
        repo::items::insert(&mut *tx, &item)
            .await
            .map_err(|err| store_error(err, "create"))?;
        Ok::<_, AppError>(item)
    }
    .await;

    match written {
        Ok(item) => {
            db::commit(tx).await?;
            info!(
                target: "catalog",
                event = "item_created",
                id = %item.id,
                category_id = %item.category
            );
            Ok(item)
        }
        Err(err) => {
            db::rollback(tx).await;
            Err(err)
        }
    }
}

/// Replace every field of an existing item.
///
/// Validation runs before the id is looked at, so a malformed payload is
/// reported as such whether or not the item exists.
pub async fn update_item(
    pool: &SqlitePool,
    id: &str,
    input: &Map<String, Value>,
) -> AppResult<Item> {
    let fields = validate_item(input).map_err(AppError::from)?;
    let id = parse_record_id(id, ITEMS_TABLE)
        .map_err(|err| err.with_context("operation", "update"))?;

    let mut tx = db::begin(pool).await?;
    let written = async {
        let category = resolve_with(&mut tx, &fields.category).await?;
        let touched = repo::items::replace(&mut *tx, &id, &fields, &category.id, now_ms())
            .await
            .map_err(|err| store_error(err, "update").with_context("id", id.clone()))?;
        if touched == 0 {
            return Err(AppError::item_not_found(&id));
        }
        let item = repo::items::find(&mut *tx, &id)
            .await
            .map_err(|err| store_error(err, "update").with_context("id", id.clone()))?
            .ok_or_else(|| AppError::item_not_found(&id))?;
        Ok::<_, AppError>(item)
    }
    .await;

    match written {
        Ok(item) => {
            db::commit(tx).await?;
            info!(
                target: "catalog",
                event = "item_updated",
                id = %item.id,
                category_id = %item.category
            );
            Ok(item)
        }
        Err(err) => {
            db::rollback(tx).await;
            Err(err)
        }
    }
}

/// Fetch one item with its category expanded.
pub async fn get_item(pool: &SqlitePool, id: &str) -> AppResult<ItemDetail> {
    let id = parse_record_id(id, ITEMS_TABLE).map_err(|err| err.with_context("operation", "get"))?;
    repo::items::find_detail(pool, &id)
        .await
        .map_err(|err| store_error(err, "get").with_context("id", id.clone()))?
        .ok_or_else(|| AppError::item_not_found(&id))
}

/// Lazily list item projections ordered by name.
///
/// A missing or blank `category_id` lists every item. Each call runs a fresh
/// query; the returned stream holds a store connection until it is drained
/// or dropped.
pub fn list_items<'a>(
    pool: &'a SqlitePool,
    category_id: Option<&str>,
) -> AppResult<BoxStream<'a, AppResult<ItemSummary>>> {
    let filter = match category_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(raw) => Some(
            parse_record_id(raw, CATEGORIES_TABLE)
                .map_err(|err| err.with_context("operation", "list"))?,
        ),
        None => None,
    };

    Ok(repo::items::stream_summaries(pool, filter)
        .map_err(|err| store_error(err, "list"))
        .boxed())
}

/// [`list_items`], collected.
pub async fn list_items_vec(
    pool: &SqlitePool,
    category_id: Option<&str>,
) -> AppResult<Vec<ItemSummary>> {
    list_items(pool, category_id)?.try_collect().await
}

/// Delete an item by id. Its category is left alone.
pub async fn delete_item(pool: &SqlitePool, id: &str) -> AppResult<Item> {
    let id = parse_record_id(id, ITEMS_TABLE)
        .map_err(|err| err.with_context("operation", "delete"))?;

    let mut tx = db::begin(pool).await?;
    let removed = async {
        let item = repo::items::find(&mut *tx, &id)
            .await
            .map_err(|err| store_error(err, "delete").with_context("id", id.clone()))?
            .ok_or_else(|| AppError::item_not_found(&id))?;
        repo::items::delete_by_id(&mut *tx, &id)
            .await
            .map_err(|err| store_error(err, "delete").with_context("id", id.clone()))?;
        Ok::<_, AppError>(item)
    }
    .await;

    match removed {
        Ok(item) => {
            db::commit(tx).await?;
            info!(target: "catalog", event = "item_deleted", id = %item.id);
            Ok(item)
        }
        Err(err) => {
            db::rollback(tx).await;
            Err(err)
        }
    }
}
