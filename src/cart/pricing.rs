use serde::{Deserialize, Serialize};

use super::CartItem;

/// Snapshot of cart totals, also the payload of the update event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub item_count: usize,
    pub subtotal: f64,
    pub fees: f64,
    pub shipping: f64,
    pub total: f64,
}

pub(crate) fn subtotal(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::line_total).sum()
}

pub(crate) fn fees(subtotal: f64, rate: f64) -> f64 {
    subtotal * rate
}

/// Digital goods; nothing ships.
pub(crate) fn shipping() -> f64 {
    0.0
}
