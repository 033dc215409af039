use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

/// A named tag grouping items. Labels are stored trimmed and uppercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub created_at: i64,
}

/// A stored catalog entry. `category` holds the referenced category id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub category: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// List projection of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// An item with its category inlined, as returned by a single-item fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub category: Category,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated, normalized item fields ready to be written.
///
/// `category` is the uppercase label, not an id; the write path resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub category: String,
}

impl<'r> FromRow<'r, SqliteRow> for Category {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            label: row.try_get("label")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Item {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            image_url: row.try_get("image_url")?,
            category: row.try_get("category_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for ItemSummary {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            image_url: row.try_get("image_url")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for ItemDetail {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            image_url: row.try_get("image_url")?,
            category: Category {
                id: row.try_get("category_id")?,
                label: row.try_get("category_label")?,
                created_at: row.try_get("category_created_at")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_exposes_only_list_fields() {
        let summary = ItemSummary {
            id: "a".into(),
            name: "orange".into(),
            image_url: "https://example.com/orange.jpg".into(),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({"id": "a", "name": "orange", "imageURL": "https://example.com/orange.jpg"})
        );
    }

    #[test]
    fn detail_inlines_category_record() {
        let detail = ItemDetail {
            id: "i".into(),
            name: "ipad".into(),
            description: "tablet".into(),
            price: 1000.0,
            image_url: "https://example.com/ipad.png".into(),
            category: Category {
                id: "c".into(),
                label: "ELECTRONICS".into(),
                created_at: 1,
            },
            created_at: 2,
            updated_at: 3,
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["category"]["label"], "ELECTRONICS");
        assert_eq!(value["imageURL"], "https://example.com/ipad.png");
    }
}
