use thiserror::Error;

/// Errors surfaced by the order core to its callers.
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Session expired: no pending order context")]
    SessionExpired,
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),
    #[error("Invalid order amount: {0}")]
    InvalidAmount(rust_decimal::Decimal),
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),
    #[error("Unknown revenue range: {0}")]
    InvalidRange(String),
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for ShopError {
    fn from(e: rocksdb::Error) -> Self {
        ShopError::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
