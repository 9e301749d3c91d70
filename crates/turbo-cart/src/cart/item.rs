//! Cart line items.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;
use crate::price::Price;

/// A product in the cart together with how many units were added.
///
/// Quantity is never zero; an item that would drop to zero is removed
/// from the cart instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Image reference.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Number of units.
    pub quantity: NonZeroU32,
}

impl Item {
    /// Number of units as a plain integer.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }
}

/// An "add to cart" request: an item without a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Image reference.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl NewItem {
    /// Create a new request.
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

    /// Turn the request into a cart item holding `quantity` units.
    pub fn into_item(self, quantity: NonZeroU32) -> Item {
        Item {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let item = NewItem::new("a", "Shirt", "u", Price::new(10.0).unwrap())
            .into_item(NonZeroU32::MIN);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "a",
                "title": "Shirt",
                "image_url": "u",
                "price": 10.0,
                "quantity": 1
            })
        );
    }

    #[test]
    fn test_zero_quantity_rejected_on_decode() {
        let result: Result<Item, _> = serde_json::from_str(
            r#"{"id":"a","title":"t","image_url":"u","price":1,"quantity":0}"#,
        );
        assert!(result.is_err());
    }
}
