//! Integration tests for cart persistence across store restarts.
//!
//! Each test uses a file-backed store in a temporary directory, drops it,
//! and reopens a fresh store over the same directory.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use go_marketplace_cart::{
    CartError, CartOptions, DEFAULT_STORAGE_KEY, DecrementPolicy, FileStore, MalformedPayload,
};
use go_marketplace_core::{Price, ProductId};
use go_marketplace_integration_tests::{open_store, product};
use serde_json::Value;

// ============================================================================
// Restart Tests
// ============================================================================

#[tokio::test]
async fn test_reopened_store_matches_last_flushed_cart() {
    let dir = tempfile::tempdir().unwrap();

    let store = open_store(dir.path(), CartOptions::default()).await.unwrap();
    store.add_to_cart(product("p1", "Tee", 1000));
    store.add_to_cart(product("p2", "Mug", 850));
    store.add_to_cart(product("p1", "Tee", 1000));
    store.decrement(&ProductId::new("p2"));
    store.flush().await.unwrap();
    let expected = store.cart();
    drop(store);

    let reopened = open_store(dir.path(), CartOptions::default()).await.unwrap();
    assert_eq!(reopened.cart(), expected);
    assert_eq!(reopened.products()[0].quantity, 2);
    assert_eq!(reopened.products()[1].quantity, 0);
}

#[tokio::test]
async fn test_end_to_end_walkthrough_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let id = ProductId::new("p1");
    let item = || go_marketplace_cart::NewLineItem::new("p1", "T", "u", Price::from(10));

    let store = open_store(dir.path(), CartOptions::default()).await.unwrap();
    store.add_to_cart(item());
    store.add_to_cart(item());
    store.decrement(&id);
    store.decrement(&id);
    store.flush().await.unwrap();
    drop(store);

    let reopened = open_store(dir.path(), CartOptions::default()).await.unwrap();
    let line = reopened.find(&id).unwrap();
    assert_eq!(line.quantity, 0);
    assert_eq!(line.title, "T");
    assert_eq!(line.image_url, "u");
    assert_eq!(line.price, Price::from(10));
}

#[tokio::test]
async fn test_persisted_file_is_json_array() {
    let dir = tempfile::tempdir().unwrap();

    let store = open_store(dir.path(), CartOptions::default()).await.unwrap();
    store.add_to_cart(product("p1", "Tee", 1999));
    store.flush().await.unwrap();

    let path = FileStore::new(dir.path()).path_for(DEFAULT_STORAGE_KEY);
    let raw = std::fs::read_to_string(path).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();

    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    let line = items[0].as_object().unwrap();
    let mut keys: Vec<&str> = line.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["id", "image_url", "price", "quantity", "title"]);
    assert_eq!(line["price"].as_f64(), Some(19.99));
}

#[tokio::test]
async fn test_existing_payload_with_integer_prices_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = FileStore::new(dir.path()).path_for(DEFAULT_STORAGE_KEY);
    std::fs::write(
        &path,
        r#"[{"id":"p1","title":"T","image_url":"u","price":10,"quantity":4}]"#,
    )
    .unwrap();

    let store = open_store(dir.path(), CartOptions::default()).await.unwrap();
    assert_eq!(store.summary().subtotal, Price::from(40));
}

#[tokio::test]
async fn test_high_precision_prices_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let price: Price = "0.3333333333333333333".parse().unwrap();
    let item = go_marketplace_cart::NewLineItem::new("p1", "Third", "u", price);

    let store = open_store(dir.path(), CartOptions::default()).await.unwrap();
    store.add_to_cart(item);
    store.flush().await.unwrap();
    drop(store);

    let reopened = open_store(dir.path(), CartOptions::default()).await.unwrap();
    assert_eq!(reopened.find(&ProductId::new("p1")).unwrap().price, price);
}

// ============================================================================
// Policy Tests
// ============================================================================

#[tokio::test]
async fn test_remove_at_zero_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let options = CartOptions::default().with_decrement_policy(DecrementPolicy::RemoveAtZero);

    let store = open_store(dir.path(), options.clone()).await.unwrap();
    store.add_to_cart(product("p1", "Tee", 1000));
    store.add_to_cart(product("p2", "Mug", 850));
    store.decrement(&ProductId::new("p1"));
    store.flush().await.unwrap();
    drop(store);

    let reopened = open_store(dir.path(), options).await.unwrap();
    assert_eq!(reopened.products().len(), 1);
    assert_eq!(reopened.products()[0].id, "p2");
}

#[tokio::test]
async fn test_corrupt_file_fail_policy_then_discard_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = FileStore::new(dir.path()).path_for(DEFAULT_STORAGE_KEY);
    std::fs::write(&path, "not a cart").unwrap();

    let strict = CartOptions::default().with_malformed_payload(MalformedPayload::Fail);
    let result = open_store(dir.path(), strict).await;
    assert!(matches!(result, Err(CartError::CorruptPayload(_))));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not a cart");

    let store = open_store(dir.path(), CartOptions::default()).await.unwrap();
    assert!(store.products().is_empty());
    store.add_to_cart(product("p1", "Tee", 1000));
    store.flush().await.unwrap();
    drop(store);

    let reopened = open_store(dir.path(), CartOptions::default()).await.unwrap();
    assert_eq!(reopened.products().len(), 1);
}
