use crate::domain::order::{
    Order, OrderId, OrderIdGenerator, OrderStatus, PendingOrder, TokenSequence, TransitionPolicy,
};
use crate::domain::ports::{OrderStore, RateCardStore};
use crate::domain::rate_card::RateCard;
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// On-disk layout: one JSON document holding every order and the rate card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Database {
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    prices: RateCard,
}

/// A persistent store that keeps the whole shop in a single JSON file.
///
/// Several processes may share one file. Every mutation takes an exclusive
/// lock on a `<file>.lock` sidecar, reloads the document, applies the change
/// and writes it to a temporary file that is atomically renamed over the
/// target. Ids and pickup numbers are derived from the reloaded orders inside
/// that critical section. Reads load the latest committed document.
///
/// This struct is thread-safe (`Clone` shares the underlying state).
#[derive(Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
    db: Arc<RwLock<Database>>,
}

impl JsonFileStore {
    /// Opens the database file, creating it with defaults when missing.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = Arc::new(path.as_ref().to_path_buf());
        let target = Arc::clone(&path);
        let (db, ()) = tokio::task::spawn_blocking(move || update(&target, |_| Ok(((), false))))
            .await
            .map_err(|e| ShopError::InternalError(Box::new(e)))??;
        debug!(path = %path.display(), orders = db.orders.len(), "Opened JSON store");

        Ok(Self {
            path,
            db: Arc::new(RwLock::new(db)),
        })
    }

    /// Runs `mutate` against the freshly loaded document under the file lock.
    ///
    /// `mutate` returns its result and whether the document changed; an
    /// unchanged document is not rewritten.
    async fn commit<R, F>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Database) -> Result<(R, bool)> + Send + 'static,
        R: Send + 'static,
    {
        let mut db = self.db.write().await;
        let path = Arc::clone(&self.path);
        let (fresh, out) = tokio::task::spawn_blocking(move || update(&path, mutate))
            .await
            .map_err(|e| ShopError::InternalError(Box::new(e)))??;
        *db = fresh;
        Ok(out)
    }

    /// The latest committed document, or the last one seen if the file is gone.
    async fn snapshot(&self) -> Result<Database> {
        match tokio::fs::read(self.path.as_ref()).await {
            Ok(bytes) => {
                let fresh: Database = serde_json::from_slice(&bytes)?;
                *self.db.write().await = fresh.clone();
                Ok(fresh)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(self.db.read().await.clone()),
            Err(e) => Err(e.into()),
        }
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn read_database(path: &Path) -> Result<Option<Database>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read-modify-write of the database file under an exclusive advisory lock.
fn update<R>(
    path: &Path,
    mutate: impl FnOnce(&mut Database) -> Result<(R, bool)>,
) -> Result<(Database, R)> {
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path(path))?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _guard = lock.write()?;

    let (mut db, existed) = match read_database(path)? {
        Some(db) => (db, true),
        None => (Database::default(), false),
    };
    let (out, changed) = mutate(&mut db)?;
    if changed || !existed {
        persist(path, &db)?;
    }
    Ok((db, out))
}

fn persist(path: &Path, db: &Database) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, db)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl OrderStore for JsonFileStore {
    async fn store(&self, order: Order) -> Result<()> {
        self.commit(move |db| {
            match db.orders.iter_mut().find(|o| o.id == order.id) {
                Some(existing) => *existing = order,
                None => db.orders.push(order),
            }
            Ok(((), true))
        })
        .await
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let db = self.snapshot().await?;
        Ok(db.orders.into_iter().find(|o| &o.id == id))
    }

    async fn create(&self, pending: PendingOrder) -> Result<Order> {
        self.commit(move |db| {
            let id = OrderIdGenerator::resume(&db.orders).next_id(pending.timestamp);
            let number = TokenSequence::resume(&db.orders).next_number();
            let order = pending.into_order(id, number);
            db.orders.push(order.clone());
            Ok((order, true))
        })
        .await
    }

    async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<Option<Order>> {
        let id = id.clone();
        self.commit(move |db| {
            let Some(order) = db.orders.iter_mut().find(|o| o.id == id) else {
                return Ok((None, false));
            };
            policy.check(order.status, status)?;
            order.status = status;
            Ok((Some(order.clone()), true))
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        Ok(self.snapshot().await?.orders)
    }
}

#[async_trait]
impl RateCardStore for JsonFileStore {
    async fn load(&self) -> Result<RateCard> {
        Ok(self.snapshot().await?.prices)
    }

    async fn replace(&self, card: RateCard) -> Result<()> {
        self.commit(move |db| {
            db.prices = card;
            Ok(((), true))
        })
        .await
    }
}
