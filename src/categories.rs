//! Category operations: find-or-create resolution, listing, and the guarded
//! delete that refuses to orphan items.

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    db,
    id::parse_record_id,
    model::Category,
    repo::{self, CATEGORIES_TABLE},
    validate::{normalize_label, Rule, ValidationError, FIELD_CATEGORY},
    AppError, AppResult,
};

fn store_error(err: sqlx::Error, operation: &'static str) -> AppError {
    AppError::from(err)
        .with_context("operation", operation)
        .with_context("table", CATEGORIES_TABLE)
}

/// All categories, ordered by label.
pub async fn list_categories(pool: &SqlitePool) -> AppResult<Vec<Category>> {
    repo::categories::list_all(pool)
        .await
        .map_err(|err| store_error(err, "list"))
}

/// Map a label onto its canonical category, creating the category on first
/// use. The label is normalized before lookup.
pub async fn resolve_category(pool: &SqlitePool, label: &str) -> AppResult<Category> {
    let label = normalize_label(label);
    if label.is_empty() {
        return Err(ValidationError::new(FIELD_CATEGORY, Rule::NotEmpty).into());
    }
    let mut conn = pool.acquire().await?;
    resolve_with(&mut conn, &label).await
}

/// Resolver body shared with the item write path, which runs it inside its
/// own transaction. `label` must already be normalized.
pub(crate) async fn resolve_with(
    conn: &mut sqlx::SqliteConnection,
    label: &str,
) -> AppResult<Category> {
    let (category, created) = repo::categories::find_or_create(conn, label)
        .await
        .map_err(|err| store_error(err, "resolve").with_context("label", label.to_string()))?;
    if created {
        info!(
            target: "catalog",
            event = "category_created",
            id = %category.id,
            label = %category.label
        );
    }
    Ok(category)
}

/// Delete a category unless an item still references it.
///
/// Existence check, reference count, and delete share one transaction.
pub async fn delete_category(pool: &SqlitePool, id: &str) -> AppResult<Category> {
    let id = parse_record_id(id, CATEGORIES_TABLE)
        .map_err(|err| err.with_context("operation", "delete"))?;

    let mut tx = db::begin(pool).await?;
    let outcome = guarded_delete(&mut tx, &id).await;
    match outcome {
        Ok(category) => {
            db::commit(tx).await?;
            info!(
                target: "catalog",
                event = "category_deleted",
                id = %category.id,
                label = %category.label
            );
            Ok(category)
        }
        Err(err) => {
            db::rollback(tx).await;
            Err(err)
        }
    }
}

async fn guarded_delete(conn: &mut sqlx::SqliteConnection, id: &str) -> AppResult<Category> {
    let category = repo::categories::find_by_id(&mut *conn, id)
        .await
        .map_err(|err| store_error(err, "delete").with_context("id", id.to_string()))?
        .ok_or_else(|| AppError::category_not_found(id))?;

    let references = repo::categories::count_items(&mut *conn, id)
        .await
        .map_err(|err| store_error(err, "delete").with_context("id", id.to_string()))?;
    if references > 0 {
        tracing::warn!(
            target: "catalog",
            event = "category_delete_blocked",
            id = %id,
            label = %category.label,
            references
        );
        return Err(AppError::category_in_use(id, references));
    }

    repo::categories::delete_by_id(&mut *conn, id)
        .await
        .map_err(|err| store_error(err, "delete").with_context("id", id.to_string()))?;
    Ok(category)
}
