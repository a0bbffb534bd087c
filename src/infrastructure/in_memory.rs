use crate::domain::order::{
    Order, OrderId, OrderIdGenerator, OrderStatus, PendingOrder, TokenSequence, TransitionPolicy,
};
use crate::domain::ports::{OrderStore, RateCardStore};
use crate::domain::rate_card::RateCard;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for orders.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` to allow shared concurrent access.
/// Ids and pickup numbers are assigned under the map's write lock, so clones
/// of the store never hand out the same id or number twice.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    tokens: Arc<TokenSequence>,
    ids: Arc<OrderIdGenerator>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with existing orders, continuing their token numbering.
    pub fn with_orders(orders: Vec<Order>) -> Self {
        let tokens = TokenSequence::resume(&orders);
        let ids = OrderIdGenerator::resume(&orders);
        let orders = orders.into_iter().map(|o| (o.id.clone(), o)).collect();
        Self {
            orders: Arc::new(RwLock::new(orders)),
            tokens: Arc::new(tokens),
            ids: Arc::new(ids),
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn create(&self, pending: PendingOrder) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let id = self.ids.next_id(pending.timestamp);
        let order = pending.into_order(id, self.tokens.next_number());
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(id) else {
            return Ok(None);
        };
        policy.check(order.status, status)?;
        order.status = status;
        Ok(Some(order.clone()))
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }
}

/// A thread-safe in-memory rate card, starting from the shop defaults.
#[derive(Default, Clone)]
pub struct InMemoryRateCardStore {
    card: Arc<RwLock<RateCard>>,
}

impl InMemoryRateCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_card(card: RateCard) -> Self {
        Self {
            card: Arc::new(RwLock::new(card)),
        }
    }
}

#[async_trait]
impl RateCardStore for InMemoryRateCardStore {
    async fn load(&self) -> Result<RateCard> {
        Ok(self.card.read().await.clone())
    }

    async fn replace(&self, card: RateCard) -> Result<()> {
        *self.card.write().await = card;
        Ok(())
    }
}
