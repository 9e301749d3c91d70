//! The cart value and its transitions.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize};

use crate::cart::{Item, NewItem};
use crate::error::CartError;
use crate::ids::ProductId;

/// An ordered list of items with unique product ids.
///
/// Transitions never mutate in place: each one returns the next cart and
/// leaves `self` untouched. Existing items keep their position; new
/// items are appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Item>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw items, checking the cart invariants.
    ///
    /// Returns an error if an id is empty or appears more than once.
    pub fn from_items(items: Vec<Item>) -> Result<Self, CartError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.id.is_empty() {
                return Err(CartError::MalformedSnapshot(
                    "item with empty id".to_string(),
                ));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CartError::MalformedSnapshot(format!(
                    "duplicate item id: {}",
                    item.id
                )));
            }
        }
        Ok(Self { items })
    }

    /// Add one unit of a product.
    ///
    /// If the product is already present its fields are replaced by the
    /// candidate's and its quantity goes up by one. Otherwise the product
    /// is appended with quantity 1.
    pub fn with_added(&self, candidate: NewItem) -> Cart {
        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.id == candidate.id) {
            Some(existing) => {
                let quantity = existing.quantity.saturating_add(1);
                *existing = candidate.into_item(quantity);
            }
            None => items.push(candidate.into_item(NonZeroU32::MIN)),
        }
        Cart { items }
    }

    /// Add one unit to an existing item. Unknown ids leave the cart unchanged.
    pub fn with_incremented(&self, id: &ProductId) -> Cart {
        let mut items = self.items.clone();
        if let Some(item) = items.iter_mut().find(|i| &i.id == id) {
            item.quantity = item.quantity.saturating_add(1);
        }
        Cart { items }
    }

    /// Remove one unit from an existing item.
    ///
    /// An item at quantity 1 is removed. Unknown ids leave the cart
    /// unchanged.
    pub fn with_decremented(&self, id: &ProductId) -> Cart {
        let mut items = self.items.clone();
        if let Some(pos) = items.iter().position(|i| &i.id == id) {
            match NonZeroU32::new(items[pos].quantity.get() - 1) {
                Some(quantity) => items[pos].quantity = quantity,
                None => {
                    items.remove(pos);
                }
            }
        }
        Cart { items }
    }

    /// Items in cart order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get an item by product id.
    pub fn get(&self, id: &ProductId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity.get())).sum()
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<Item>::deserialize(deserializer)?;
        Cart::from_items(items).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
