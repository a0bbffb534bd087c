//! Domain model of the print shop: options, pricing, orders and the ports
//! the application layer talks through.

pub mod event;
pub mod options;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod rate_card;
