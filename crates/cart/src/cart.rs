//! Cart model and mutation rules.
//!
//! Everything here is synchronous and storage-agnostic. [`CartStore`] wraps
//! a [`Cart`] and adds persistence around these operations.
//!
//! [`CartStore`]: crate::CartStore

use std::collections::HashSet;

use go_marketplace_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::options::DecrementPolicy;

/// A product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
    /// Units in the cart. Signed: the default decrement policy lets this
    /// reach zero and go below.
    pub quantity: i64,
}

impl LineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A product descriptor as handed to `add_to_cart`, without a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
}

impl NewLineItem {
    /// Create a new descriptor.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    fn with_quantity(self, quantity: i64) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

/// Totals derived from a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Number of distinct line items.
    pub line_count: usize,
    /// Sum of all quantities.
    pub item_count: i64,
    /// Sum of all line totals.
    pub subtotal: Price,
}

/// Ordered line items, unique by id, in insertion order.
///
/// Serializes as the bare JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from existing items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::DuplicateLineItem` if two items share an id.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(CartError::DuplicateLineItem(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Parse a persisted cart payload.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CorruptPayload` if the payload is not a JSON array
    /// of line items, or `CartError::DuplicateLineItem` if ids repeat.
    pub fn from_json(payload: &str) -> Result<Self, CartError> {
        let items: Vec<LineItem> = serde_json::from_str(payload)
            .map_err(|e| CartError::CorruptPayload(e.to_string()))?;
        Self::from_items(items)
    }

    /// Serialize the cart to its persisted form.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CorruptPayload` if serialization fails.
    pub fn to_json(&self) -> Result<String, CartError> {
        serde_json::to_string(&self.items).map_err(|e| CartError::CorruptPayload(e.to_string()))
    }

    /// The line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The item with the given id, if present.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product.
    ///
    /// An existing item keeps its position, gains one unit, and takes the
    /// incoming title, image and price. A new item is appended with quantity 1.
    pub fn add(&mut self, item: NewLineItem) {
        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            let quantity = existing.quantity.saturating_add(1);
            *existing = item.with_quantity(quantity);
        } else {
            self.items.push(item.with_quantity(1));
        }
    }

    /// Add one unit to every item matching `id`. Returns whether any matched.
    pub fn increment(&mut self, id: &ProductId) -> bool {
        let mut matched = false;
        for item in self.items.iter_mut().filter(|item| &item.id == id) {
            item.quantity = item.quantity.saturating_add(1);
            matched = true;
        }
        matched
    }

    /// Remove one unit from every item matching `id`. Returns whether any
    /// matched.
    pub fn decrement(&mut self, id: &ProductId, policy: DecrementPolicy) -> bool {
        let mut matched = false;
        for item in self.items.iter_mut().filter(|item| &item.id == id) {
            item.quantity = item.quantity.saturating_sub(1);
            matched = true;
        }

        if matched && policy == DecrementPolicy::RemoveAtZero {
            self.items.retain(|item| &item.id != id || item.quantity > 0);
        }
        matched
    }

    /// Item count and subtotal.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            line_count: self.items.len(),
            item_count: self.items.iter().map(|item| item.quantity).sum(),
            subtotal: self.items.iter().map(LineItem::line_total).sum(),
        }
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<LineItem>::deserialize(deserializer)?;
        Self::from_items(items).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn tee() -> NewLineItem {
        NewLineItem::new("p1", "T", "u", Price::from(10))
    }

    fn mug() -> NewLineItem {
        NewLineItem::new("p2", "Mug", "https://img/mug.png", Price::from_cents(850))
    }

    #[test]
    fn test_add_new_item_starts_at_one() {
        let mut cart = Cart::new();
        cart.add(tee());

        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.items()[0],
            LineItem {
                id: ProductId::new("p1"),
                title: "T".to_string(),
                image_url: "u".to_string(),
                price: Price::from(10),
                quantity: 1,
            }
        );
    }

    #[test]
    fn test_add_existing_item_bumps_quantity_and_overwrites_fields() {
        let mut cart = Cart::new();
        cart.add(tee());
        cart.add(mug());
        cart.increment(&ProductId::new("p1"));

        let renamed = NewLineItem::new("p1", "Tee v2", "u2", Price::from(12));
        cart.add(renamed);

        assert_eq!(cart.len(), 2);
        let first = &cart.items()[0];
        assert_eq!(first.id, "p1");
        assert_eq!(first.quantity, 3);
        assert_eq!(first.title, "Tee v2");
        assert_eq!(first.image_url, "u2");
        assert_eq!(first.price, Price::from(12));
        assert_eq!(cart.items()[1].id, "p2");
    }

    #[test]
    fn test_increment_touches_only_matching_item() {
        let mut cart = Cart::new();
        cart.add(tee());
        cart.add(mug());
        let before = cart.items()[1].clone();

        assert!(cart.increment(&ProductId::new("p1")));

        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1], before);
    }

    #[test]
    fn test_decrement_is_unbounded_by_default() {
        let mut cart = Cart::new();
        cart.add(tee());
        let id = ProductId::new("p1");

        assert!(cart.decrement(&id, DecrementPolicy::Unbounded));
        assert_eq!(cart.find(&id).unwrap().quantity, 0);

        assert!(cart.decrement(&id, DecrementPolicy::Unbounded));
        assert_eq!(cart.find(&id).unwrap().quantity, -1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_decrement_remove_at_zero_drops_item() {
        let mut cart = Cart::new();
        cart.add(tee());
        cart.add(mug());
        cart.add(mug());

        assert!(cart.decrement(&ProductId::new("p1"), DecrementPolicy::RemoveAtZero));
        assert!(cart.decrement(&ProductId::new("p2"), DecrementPolicy::RemoveAtZero));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id, "p2");
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_unknown_id_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(tee());
        let before = cart.clone();
        let missing = ProductId::new("nope");

        assert!(!cart.increment(&missing));
        assert!(!cart.decrement(&missing, DecrementPolicy::Unbounded));
        assert!(!cart.decrement(&missing, DecrementPolicy::RemoveAtZero));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_then_decrement_walkthrough() {
        let mut cart = Cart::new();
        let id = ProductId::new("p1");

        cart.add(tee());
        cart.add(tee());
        assert_eq!(cart.find(&id).unwrap().quantity, 2);

        cart.decrement(&id, DecrementPolicy::Unbounded);
        assert_eq!(cart.find(&id).unwrap().quantity, 1);

        cart.decrement(&id, DecrementPolicy::Unbounded);
        assert_eq!(cart.find(&id).unwrap().quantity, 0);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_summary_totals() {
        let mut cart = Cart::new();
        cart.add(tee());
        cart.add(tee());
        cart.add(mug());

        let summary = cart.summary();
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, Price::from_cents(2850));
    }

    #[test]
    fn test_from_json_reads_persisted_shape() {
        let payload = r#"[
            {"id":"p1","title":"T","image_url":"u","price":10,"quantity":2},
            {"id":"p2","title":"Mug","image_url":"m","price":8.5,"quantity":1}
        ]"#;

        let cart = Cart::from_json(payload).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].price, Price::from_cents(850));
    }

    #[test]
    fn test_from_json_rejects_malformed_payloads() {
        assert!(matches!(
            Cart::from_json("{not json"),
            Err(CartError::CorruptPayload(_))
        ));
        assert!(matches!(
            Cart::from_json(r#"[{"id":"p1"}]"#),
            Err(CartError::CorruptPayload(_))
        ));

        let duplicated = r#"[
            {"id":"p1","title":"T","image_url":"u","price":10,"quantity":1},
            {"id":"p1","title":"T","image_url":"u","price":10,"quantity":4}
        ]"#;
        assert!(matches!(
            Cart::from_json(duplicated),
            Err(CartError::DuplicateLineItem(id)) if id == "p1"
        ));
    }

    #[test]
    fn test_to_json_is_bare_array() {
        let mut cart = Cart::new();
        cart.add(tee());

        let value: serde_json::Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "p1");
        assert_eq!(items[0]["quantity"], 1);
        assert_eq!(items[0]["price"].as_f64(), Some(10.0));
    }
}
