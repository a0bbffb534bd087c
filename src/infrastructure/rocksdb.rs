use crate::domain::order::{
    Order, OrderId, OrderIdGenerator, OrderStatus, PendingOrder, TokenSequence, TransitionPolicy,
};
use crate::domain::ports::{OrderStore, RateCardStore};
use crate::domain::rate_card::RateCard;
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing orders, keyed by order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for shop settings such as the rate card.
pub const CF_SETTINGS: &str = "settings";

const RATE_CARD_KEY: &[u8] = b"rate_card";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both orders and the rate card using separate Column
/// Families. Writes are serialized through a write lock so a read-modify-write
/// of one order, or the id and number assignment of a new one, cannot
/// interleave with another. RocksDB itself keeps other processes out.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    tokens: Arc<TokenSequence>,
    ids: Arc<OrderIdGenerator>,
    writes: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("orders" and "settings") exist
    /// and resumes token numbering from the orders already on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_settings = ColumnFamilyDescriptor::new(CF_SETTINGS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_settings])?;

        let store = Self {
            db: Arc::new(db),
            tokens: Arc::new(TokenSequence::default()),
            ids: Arc::new(OrderIdGenerator::new()),
            writes: Arc::new(Mutex::new(())),
        };
        let orders = store.scan_orders()?;
        Ok(Self {
            tokens: Arc::new(TokenSequence::resume(&orders)),
            ids: Arc::new(OrderIdGenerator::resume(&orders)),
            ..store
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            ShopError::InternalError(Box::new(std::io::Error::other(format!(
                "Column family not found: {name}"
            ))))
        })
    }

    fn scan_orders(&self) -> Result<Vec<Order>> {
        let handle = self.cf(CF_ORDERS)?;
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(handle, IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(serde_json::from_slice(&value)?);
        }
        Ok(orders)
    }

    fn read_order(&self, id: &OrderId) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        match self.db.get_cf(cf, id.0.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_order(&self, order: &Order) -> Result<()> {
        let cf = self.cf(CF_ORDERS)?;
        let value = serde_json::to_vec(order)?;
        self.db.put_cf(cf, order.id.0.as_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: Order) -> Result<()> {
        let _guard = self.writes.lock().await;
        self.write_order(&order)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        self.read_order(id)
    }

    async fn create(&self, pending: PendingOrder) -> Result<Order> {
        let _guard = self.writes.lock().await;
        let id = self.ids.next_id(pending.timestamp);
        let order = pending.into_order(id, self.tokens.next_number());
        self.write_order(&order)?;
        Ok(order)
    }

    async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<Option<Order>> {
        let _guard = self.writes.lock().await;
        let Some(mut order) = self.read_order(id)? else {
            return Ok(None);
        };
        policy.check(order.status, status)?;
        order.status = status;
        self.write_order(&order)?;
        Ok(Some(order))
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.scan_orders()
    }
}

#[async_trait]
impl RateCardStore for RocksDBStore {
    async fn load(&self) -> Result<RateCard> {
        let cf = self.cf(CF_SETTINGS)?;
        match self.db.get_cf(cf, RATE_CARD_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(RateCard::default()),
        }
    }

    async fn replace(&self, card: RateCard) -> Result<()> {
        let cf = self.cf(CF_SETTINGS)?;
        let value = serde_json::to_vec(&card)?;
        self.db.put_cf(cf, RATE_CARD_KEY, value)?;
        Ok(())
    }
}
