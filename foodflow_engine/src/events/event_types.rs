use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatus};

/// Emitted when a payment against an order is confirmed and the order's payment status flips to `Paid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted on every accepted order-status transition. `order` carries the new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub old_status: OrderStatus,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, old_status: OrderStatus) -> Self {
        Self { order, old_status }
    }

    pub fn new_status(&self) -> OrderStatus {
        self.order.status
    }
}
