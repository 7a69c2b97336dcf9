//! Checkout under both commit policies.

#[path = "../support/mod.rs"]
mod support;

mod gate;
mod sequential;
mod two_phase;
