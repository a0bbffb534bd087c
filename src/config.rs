//! Runtime settings for the shop, resolved from flags, the environment and
//! an optional `.env` file.

use crate::application::shop::PrintShop;
use crate::domain::order::TransitionPolicy;
use crate::domain::ports::{EventPublisher, OrderStoreBox, PaymentVerifierBox, RateCardStoreBox};
use crate::error::Result;
use crate::infrastructure::json_file::JsonFileStore;
use crate::infrastructure::payment::{DummyVerifier, SignatureVerifier};
use crate::infrastructure::uploads::LocalUploads;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct ShopConfig {
    /// JSON database holding orders and the rate card.
    #[arg(long, env = "PRINTDESK_DATA", default_value = "db.json")]
    pub data: PathBuf,

    /// Path to a RocksDB database. Requires the `storage-rocksdb` feature.
    #[arg(long, env = "PRINTDESK_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Directory accepted uploads are copied into.
    #[arg(long, env = "PRINTDESK_UPLOADS", default_value = "uploads/orders")]
    pub uploads: PathBuf,

    /// Gateway secret. Without it payments run in dummy mode.
    #[arg(long, env = "PRINTDESK_PAYMENT_SECRET", hide_env_values = true)]
    pub payment_secret: Option<String>,

    /// How admin status changes are checked.
    #[arg(long, env = "PRINTDESK_TRANSITIONS", value_enum, default_value_t = TransitionPolicy::Lenient)]
    pub transitions: TransitionPolicy,
}

impl ShopConfig {
    /// Picks the payment verifier: a configured secret enables signature checks.
    pub fn verifier(&self) -> PaymentVerifierBox {
        match self.payment_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Box::new(SignatureVerifier::new(secret)),
            None => Box::new(DummyVerifier),
        }
    }

    async fn stores(&self) -> Result<(OrderStoreBox, RateCardStoreBox)> {
        if let Some(db_path) = &self.db_path {
            #[cfg(feature = "storage-rocksdb")]
            {
                let store = crate::infrastructure::rocksdb::RocksDBStore::open(db_path)?;
                info!(path = %db_path.display(), "Using RocksDB storage");
                return Ok((Box::new(store.clone()), Box::new(store)));
            }
            #[cfg(not(feature = "storage-rocksdb"))]
            tracing::warn!(
                path = %db_path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to JSON file storage."
            );
        }

        let store = JsonFileStore::open(&self.data).await?;
        info!(path = %self.data.display(), "Using JSON file storage");
        Ok((Box::new(store.clone()), Box::new(store)))
    }

    /// Opens the configured stores and assembles the shop around them.
    pub async fn open_shop(&self, events: Arc<dyn EventPublisher>) -> Result<PrintShop> {
        let (orders, rates) = self.stores().await?;
        let shop = PrintShop::new(orders, rates, Box::new(LocalUploads), self.verifier(), events)
            .with_transition_policy(self.transitions);
        Ok(shop)
    }
}
