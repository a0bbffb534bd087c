//! Adapters for the domain ports: storage backends, live broadcast, payment
//! verification and upload handling.

pub mod broadcast;
pub mod in_memory;
pub mod json_file;
pub mod payment;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod uploads;
