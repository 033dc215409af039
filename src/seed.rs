//! Starter catalog for fresh stores.

use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use tracing::info;

use crate::{items::create_item, repo, AppError, AppResult};

struct SeedItem {
    name: &'static str,
    description: &'static str,
    price: f64,
    image_url: &'static str,
    category: &'static str,
}

const DEFAULT_ITEMS: &[SeedItem] = &[
    SeedItem {
        name: "sockeye salmon",
        description: "a large omnivorous fish native to British Columbia",
        price: 25.25,
        image_url: "https://upload.wikimedia.org/wikipedia/commons/6/63/Oncorhynchus_nerka.jpg",
        category: "seafood",
    },
    SeedItem {
        name: "ipad",
        description: "tablet computer device by Apple",
        price: 1000.0,
        image_url: "https://upload.wikimedia.org/wikipedia/commons/d/d8/IPad_Pro_11_mockup.png",
        category: "electronics",
    },
    SeedItem {
        name: "white cotton socks",
        description: "cotton clothing worn on the feet",
        price: 10.0,
        image_url: "https://as2.ftcdn.net/v2/jpg/02/86/46/23/1000_F_286462331_SGRBwvdnzciSCSXhnem1FHGsgGkeZHos.jpg",
        category: "clothing",
    },
    SeedItem {
        name: "orange",
        description: "citrus fruit rich in vitamin C",
        price: 2.12,
        image_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/4/49/Mandarin_Oranges_%28Citrus_Reticulata%29.jpg/1920px-Mandarin_Oranges_%28Citrus_Reticulata%29.jpg",
        category: "fruit",
    },
    SeedItem {
        name: "watermelon",
        description: "large green fruit that is sweet and very watery",
        price: 15.69,
        image_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/a/ae/Watermelon_cross_BNC.jpg/1920px-Watermelon_cross_BNC.jpg",
        category: "Fruit",
    },
    SeedItem {
        name: "bottled water",
        description: "portable source of water",
        price: 3.0,
        image_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/0/0d/PET_Bottle_Water.jpg/1920px-PET_Bottle_Water.jpg",
        category: "beverage",
    },
];

impl SeedItem {
    fn payload(&self) -> Map<String, Value> {
        let value = json!({
            "name": self.name,
            "description": self.description,
            "price": self.price,
            "imageURL": self.image_url,
            "category": self.category,
        });
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Insert the starter items when the catalog holds no items. Returns how
/// many were written; a non-empty catalog is left untouched.
pub async fn seed_defaults(pool: &SqlitePool) -> AppResult<usize> {
    let existing = repo::items::count(pool)
        .await
        .map_err(|err| AppError::from(err).with_context("operation", "seed"))?;
    if existing > 0 {
        info!(target: "catalog", event = "seed_skipped", existing);
        return Ok(0);
    }

    for entry in DEFAULT_ITEMS {
        create_item(pool, &entry.payload()).await?;
    }
    info!(target: "catalog", event = "seed_applied", items = DEFAULT_ITEMS.len());
    Ok(DEFAULT_ITEMS.len())
}
