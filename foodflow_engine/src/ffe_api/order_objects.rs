use serde::{Deserialize, Serialize};

use ff_common::Cents;

use crate::db_types::{NewOrder, NewOrderItem, Order, OrderItem, PaymentMethod, Restaurant, UserId};

/// An order header together with its line items. This is the shape the storefront returns to clients, with the
/// header fields flattened to the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items }
    }
}

/// A single cart line as submitted by a client. Clients only get to say *which* item and *how many*. Names and
/// prices are resolved against the live menu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineItemRequest {
    #[serde(rename = "menuItem")]
    pub menu_item_id: i64,
    pub quantity: i64,
}

impl LineItemRequest {
    pub fn new(menu_item_id: i64, quantity: i64) -> Self {
        Self { menu_item_id, quantity }
    }
}

/// The result of pricing a cart against the current menu: resolved line items and a server-computed total.
///
/// A `PricedOrder` is not yet an order. It carries no user, address, or payment details. Call
/// [`PricedOrder::into_new_order`] with those to produce the record that gets stored.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub restaurant: Restaurant,
    pub items: Vec<NewOrderItem>,
    pub total: Cents,
}

impl PricedOrder {
    pub fn into_new_order(
        self,
        user_id: UserId,
        delivery_address: String,
        payment_method: PaymentMethod,
        payment_ref: String,
    ) -> NewOrder {
        NewOrder {
            user_id,
            restaurant_id: self.restaurant.id,
            total_amount: self.total,
            delivery_address,
            payment_method,
            payment_ref,
            items: self.items,
        }
    }
}
