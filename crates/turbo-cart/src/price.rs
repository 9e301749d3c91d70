//! Unit price of a cart item.
//!
//! Prices travel as plain JSON numbers in the persisted snapshot, so the
//! value is kept as a float. Construction rejects negative and non-finite
//! values; deserialization goes through the same check.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CartError;

/// A non-negative, finite unit price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Create a price, rejecting negative and non-finite amounts.
    pub fn new(amount: f64) -> Result<Self, CartError> {
        if amount.is_finite() && amount >= 0.0 {
            // Collapse -0.0 so equality and display stay stable.
            Ok(Self(amount + 0.0))
        } else {
            Err(CartError::InvalidPrice(amount))
        }
    }

    /// A zero price.
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Get the amount.
    pub fn amount(&self) -> f64 {
        self.0
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Format with two decimal places (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl TryFrom<f64> for Price {
    type Error = CartError;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_amount())
    }
}
