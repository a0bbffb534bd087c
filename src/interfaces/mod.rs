//! Outer surfaces that move orders in and out of the shop.

pub mod csv;
