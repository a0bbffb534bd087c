//! Live fan-out of order events to admin observers.
//!
//! Each observer owns a small bounded inbox. Publishing never waits: an inbox
//! that is full is skipped for that event, and an inbox whose receiver was
//! dropped is removed from the registry. There is no backfill; an observer
//! that (re)connects is expected to re-read the order list.

use crate::domain::event::OrderEvent;
use crate::domain::ports::EventPublisher;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Default inbox size per observer.
pub const DEFAULT_INBOX_CAPACITY: usize = 64;

type Registry = Arc<Mutex<HashMap<u64, mpsc::Sender<OrderEvent>>>>;

/// Registry of live observers.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    subscribers: Registry,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_INBOX_CAPACITY)
    }
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            capacity: capacity.max(1),
        }
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().insert(id, tx);
        debug!(subscriber = id, "Observer connected");
        Subscription {
            id,
            receiver: rx,
            registry: Arc::clone(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Sends `event` to every observer ready to take it.
    pub fn broadcast(&self, event: OrderEvent) -> usize {
        let mut subscribers = self.subscribers.lock();
        let mut delivered = 0;
        subscribers.retain(|id, tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!(subscriber = id, "Observer not ready, event skipped");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = id, "Observer gone, removing");
                false
            }
        });
        debug!(
            event = event.event_type(),
            token = %event.order().token_id,
            delivered,
            "Broadcast order event"
        );
        delivered
    }
}

impl EventPublisher for Broadcaster {
    fn publish(&self, event: OrderEvent) -> usize {
        self.broadcast(event)
    }
}

/// Receiving end held by one observer. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<OrderEvent>,
    registry: Registry,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the next event. Returns `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<OrderEvent> {
        self.receiver.recv().await
    }

    /// Returns an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<OrderEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Order, OrderId, OrderStatus, Token, TokenPrefix, UploadedFile};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn event(number: u64) -> OrderEvent {
        OrderEvent::NewOrder(Order {
            id: OrderId::from(number.to_string()),
            token_id: Token::new(TokenPrefix::BlackAndWhite, number),
            timestamp: Utc::now(),
            details: "1 pages, BW, Single-Sided (1 copy)".to_string(),
            phone: "9876543210".to_string(),
            file: UploadedFile::new("uploads/orders/b.pdf", "b.pdf"),
            status: OrderStatus::New,
            price: dec!(2),
        })
    }

    #[tokio::test]
    async fn test_every_observer_receives_event() {
        let hub = Broadcaster::default();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.broadcast(event(101)), 2);
        assert_eq!(a.recv().await.unwrap(), event(101));
        assert_eq!(b.recv().await.unwrap(), event(101));
    }

    #[tokio::test]
    async fn test_publish_without_observers() {
        let hub = Broadcaster::default();
        assert_eq!(hub.publish(event(101)), 0);
    }

    #[tokio::test]
    async fn test_full_inbox_is_skipped_not_queued() {
        let hub = Broadcaster::new(1);
        let mut slow = hub.subscribe();
        let mut fast = hub.subscribe();

        assert_eq!(hub.broadcast(event(101)), 2);
        assert_eq!(fast.recv().await.unwrap(), event(101));

        // `slow` still holds event 101, so 102 only reaches `fast`.
        assert_eq!(hub.broadcast(event(102)), 1);
        assert_eq!(fast.recv().await.unwrap(), event(102));
        assert_eq!(slow.recv().await.unwrap(), event(101));
        assert!(slow.try_recv().is_none());
        assert_eq!(hub.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_removed() {
        let hub = Broadcaster::default();
        let kept = hub.subscribe();
        let dropped = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(dropped);
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(hub.broadcast(event(101)), 1);
        drop(kept);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
