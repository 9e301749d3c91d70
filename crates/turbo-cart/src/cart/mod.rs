//! Shopping cart module.
//!
//! Contains the cart value, its line items, and the pure transitions the
//! store applies on every mutation.

mod cart;
mod item;

pub use cart::Cart;
pub use item::{Item, NewItem};
