//! Cart Service - the buyer's in-progress order.
//!
//! The cart is an ordered list of [`CartItem`] snapshots persisted as one JSON
//! document under [`CART_KEY`] after every mutation and restored on load.
//! Snapshots are point-in-time copies; they are re-validated against live
//! accounts only by [`Cart::start_checkout`] and [`Cart::process_checkout`].
//!
//! With the `emitter` feature every persisted mutation also emits
//! [`CART_UPDATED`] carrying a [`CartSummary`].

mod cart;
mod checkout;
mod item;
mod pricing;

use serde::{Deserialize, Serialize};

pub use cart::Cart;
pub use checkout::{BuyerInfo, CheckoutGate, CheckoutPolicy, CheckoutReceipt, CHECKOUT_RETURN_TO};
pub use item::CartItem;
pub use pricing::CartSummary;

/// Storage key of the persisted cart.
pub const CART_KEY: &str = "cart";

/// Event emitted after each persisted cart mutation.
pub const CART_UPDATED: &str = "cart_updated";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Service fee as a fraction of the subtotal.
    pub fee_rate: f64,
    /// Upper clamp for line quantities. The lower clamp is always 1.
    pub max_quantity: u32,
    pub policy: CheckoutPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            fee_rate: 0.05,
            max_quantity: 10,
            policy: CheckoutPolicy::default(),
        }
    }
}
