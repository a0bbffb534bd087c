use serde::{Deserialize, Serialize};

use super::order::Order;

/// Lifecycle notification pushed to live admin observers.
///
/// Serialized as `{"type": "new_order" | "status_update", "payload": <order>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OrderEvent {
    NewOrder(Order),
    StatusUpdate(Order),
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::NewOrder(_) => "new_order",
            OrderEvent::StatusUpdate(_) => "status_update",
        }
    }

    pub fn order(&self) -> &Order {
        match self {
            OrderEvent::NewOrder(order) | OrderEvent::StatusUpdate(order) => order,
        }
    }
}
