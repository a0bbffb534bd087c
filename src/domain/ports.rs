use super::event::OrderEvent;
use super::order::{Order, OrderId, OrderStatus, PendingOrder, TransitionPolicy, UploadedFile};
use super::payment::{PaymentConfirmation, PaymentMode};
use super::rate_card::RateCard;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts or overwrites an order under its id.
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, id: &OrderId) -> Result<Option<Order>>;
    /// Assigns the next order id and pickup number to `pending` and inserts
    /// it, as one step with respect to every other writer of the store.
    async fn create(&self, pending: PendingOrder) -> Result<Order>;
    /// Moves one order to `status` if `policy` allows it from the stored
    /// status. Check and write happen under the same lock. Returns the
    /// updated record, or `None` when the id is unknown.
    async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<Option<Order>>;
    async fn get_all(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait RateCardStore: Send + Sync {
    async fn load(&self) -> Result<RateCard>;
    /// Replaces the whole card.
    async fn replace(&self, card: RateCard) -> Result<()>;
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Deletes an upload that will never become an order.
    async fn release(&self, file: &UploadedFile) -> Result<()>;
}

pub trait PaymentVerifier: Send + Sync {
    fn mode(&self) -> PaymentMode;
    fn verify(&self, confirmation: &PaymentConfirmation) -> bool;
}

pub trait EventPublisher: Send + Sync {
    /// Fans an event out to live observers, returning how many received it.
    fn publish(&self, event: OrderEvent) -> usize;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type RateCardStoreBox = Box<dyn RateCardStore>;
pub type UploadStoreBox = Box<dyn UploadStore>;
pub type PaymentVerifierBox = Box<dyn PaymentVerifier>;
