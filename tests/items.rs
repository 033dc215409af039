use anyhow::Result;
use futures::StreamExt;
use serde_json::json;

use catalog_lib::{
    create_item, delete_item,
    error::{ITEM_NOT_FOUND, STORE_CAST},
    get_item, list_items, list_items_vec, update_item, ErrorKind,
};

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn create_stores_fields_and_category_reference() -> Result<()> {
    let pool = util::temp_pool().await;

    let item = create_item(
        &pool,
        &util::fields(json!({
            "name": "  sockeye salmon ",
            "description": "a large omnivorous fish",
            "price": "25.25",
            "imageURL": "https://example.com/salmon.jpg",
            "category": "seafood",
        })),
    )
    .await?;
    assert_eq!(item.name, "sockeye salmon");
    assert_eq!(item.price, 25.25);

    let detail = get_item(&pool, &item.id).await?;
    assert_eq!(detail.id, item.id);
    assert_eq!(detail.category.id, item.category);
    assert_eq!(detail.category.label, "SEAFOOD");
    assert_eq!(detail.image_url, "https://example.com/salmon.jpg");
    Ok(())
}

#[tokio::test]
async fn invalid_create_writes_nothing() -> Result<()> {
    let pool = util::temp_pool().await;

    let mut payload = util::item_payload("orange", "fruit");
    payload.insert("price".into(), json!(-1));
    let err = create_item(&pool, &payload).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.code(), "VALIDATION/MIN");
    assert_eq!(err.context().get("field").map(String::as_str), Some("price"));
    assert_eq!(util::item_count(&pool).await, 0);
    assert_eq!(util::category_count(&pool).await, 0);
    Ok(())
}

#[tokio::test]
async fn list_is_ordered_and_projected() -> Result<()> {
    let pool = util::temp_pool().await;

    for name in ["watermelon", "bottled water", "orange"] {
        create_item(&pool, &util::item_payload(name, "grocery")).await?;
    }
    let listed = list_items_vec(&pool, None).await?;
    let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["bottled water", "orange", "watermelon"]);

    let value = serde_json::to_value(&listed[0])?;
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3);
    assert!(value.get("imageURL").is_some());
    Ok(())
}

#[tokio::test]
async fn list_filters_by_category() -> Result<()> {
    let pool = util::temp_pool().await;

    let fruit = create_item(&pool, &util::item_payload("orange", "fruit")).await?;
    create_item(&pool, &util::item_payload("ipad", "electronics")).await?;
    create_item(&pool, &util::item_payload("apple", "FRUIT")).await?;

    let listed = list_items_vec(&pool, Some(&fruit.category)).await?;
    let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["apple", "orange"]);

    let everything = list_items_vec(&pool, Some("")).await?;
    assert_eq!(everything.len(), 3);

    let unknown = catalog_lib::id::new_uuid_v7();
    assert!(list_items_vec(&pool, Some(&unknown)).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn list_with_malformed_filter_is_store_error() -> Result<()> {
    let pool = util::temp_pool().await;

    let err = list_items(&pool, Some("bogus")).err().unwrap();
    assert_eq!(err.code(), STORE_CAST);
    Ok(())
}

#[tokio::test]
async fn list_stream_yields_lazily() -> Result<()> {
    let pool = util::temp_pool().await;

    for name in ["a", "b", "c"] {
        create_item(&pool, &util::item_payload(name, "letters")).await?;
    }
    let first = {
        let mut stream = list_items(&pool, None)?;
        stream.next().await.transpose()?
    };
    assert_eq!(first.map(|s| s.name), Some("a".to_string()));
    Ok(())
}

#[tokio::test]
async fn get_unknown_item_is_not_found() -> Result<()> {
    let pool = util::temp_pool().await;

    let err = get_item(&pool, &catalog_lib::id::new_uuid_v7())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ITEM_NOT_FOUND);
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = get_item(&pool, "1234").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    Ok(())
}

#[tokio::test]
async fn update_replaces_fields_and_resolves_new_label() -> Result<()> {
    let pool = util::temp_pool().await;

    let item = create_item(&pool, &util::item_payload("ipad", "electronics")).await?;
    let mut payload = util::item_payload("ipad pro", "tablets");
    payload.insert("price".into(), json!(1200));

    let updated = update_item(&pool, &item.id, &payload).await?;
    assert_eq!(updated.id, item.id);
    assert_eq!(updated.name, "ipad pro");
    assert_eq!(updated.price, 1200.0);
    assert_ne!(updated.category, item.category);
    assert_eq!(updated.created_at, item.created_at);
    assert!(updated.updated_at >= item.updated_at);

    let detail = get_item(&pool, &item.id).await?;
    assert_eq!(detail.category.label, "TABLETS");
    // The old category stays behind even with no items.
    assert_eq!(util::category_count(&pool).await, 2);
    Ok(())
}

#[tokio::test]
async fn update_missing_item_is_not_found_and_creates_no_category() -> Result<()> {
    let pool = util::temp_pool().await;

    let err = update_item(
        &pool,
        &catalog_lib::id::new_uuid_v7(),
        &util::item_payload("ghost", "phantoms"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ITEM_NOT_FOUND);
    assert_eq!(util::category_count(&pool).await, 0);
    Ok(())
}

#[tokio::test]
async fn update_validates_before_looking_up_item() -> Result<()> {
    let pool = util::temp_pool().await;

    let mut payload = util::item_payload("ghost", "phantoms");
    payload.remove("name");
    let err = update_item(&pool, &catalog_lib::id::new_uuid_v7(), &payload)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = update_item(&pool, "not-an-id", &payload).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn delete_returns_item_and_removes_it() -> Result<()> {
    let pool = util::temp_pool().await;

    let item = create_item(&pool, &util::item_payload("socks", "clothing")).await?;
    let removed = delete_item(&pool, &item.id).await?;
    assert_eq!(removed, item);
    assert_eq!(util::item_count(&pool).await, 0);

    let err = delete_item(&pool, &item.id).await.unwrap_err();
    assert_eq!(err.code(), ITEM_NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn seed_fills_empty_catalog_once() -> Result<()> {
    let pool = util::temp_pool().await;

    let inserted = catalog_lib::seed::seed_defaults(&pool).await?;
    assert_eq!(inserted, 6);
    assert_eq!(util::item_count(&pool).await, 6);
    // "fruit" and "Fruit" share one category.
    assert_eq!(util::category_count(&pool).await, 5);

    assert_eq!(catalog_lib::seed::seed_defaults(&pool).await?, 0);
    assert_eq!(util::item_count(&pool).await, 6);
    Ok(())
}
