//! Application layer orchestrating the order core.
//!
//! `PrintShop` is the entry point for pricing, checkout, payment confirmation
//! and admin status changes. Dashboard aggregates live in [`stats`] as pure
//! functions over the order list.

pub mod shop;
pub mod stats;
