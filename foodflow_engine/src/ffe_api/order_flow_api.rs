use std::fmt::Debug;

use log::*;

use ff_common::Cents;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderStatus},
    events::{EventProducers, OrderPaidEvent, OrderStatusChangedEvent},
    order_objects::{LineItemRequest, OrderWithItems, PricedOrder},
    traits::{OrderFlowDatabase, OrderFlowError},
};

/// The largest quantity accepted for a single order line. Line subtotals are unchecked `i64` cents, so quantities
/// must stay small enough that `unit_price * quantity` cannot wrap.
pub const MAX_LINE_QUANTITY: i64 = 1_000;

/// `OrderFlowApi` is the primary API for handling order and payment flows: pricing carts against the live menu,
/// placing orders, confirming provider payments, and moving orders through fulfilment.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderFlowDatabase
{
    /// Prices a cart against the current menu.
    ///
    /// Every line is resolved against the catalogue: the item must exist, belong to the given restaurant, and be
    /// available. Names and unit prices always come from the menu, never from the client, and the total is the sum
    /// of `unit_price * quantity` over the resolved lines. Whatever total a client may have displayed locally plays
    /// no part in the result. Quantities outside `1..=`[`MAX_LINE_QUANTITY`] fail with
    /// [`OrderFlowError::InvalidQuantity`].
    ///
    /// The result is a [`PricedOrder`], which the caller turns into a [`NewOrder`] once the payment reference is
    /// known (after creating the provider order, for online payments).
    pub async fn price_order(
        &self,
        restaurant_id: i64,
        items: &[LineItemRequest],
    ) -> Result<PricedOrder, OrderFlowError> {
        if items.is_empty() {
            return Err(OrderFlowError::EmptyOrder);
        }
        if items.iter().any(|line| line.quantity < 1 || line.quantity > MAX_LINE_QUANTITY) {
            return Err(OrderFlowError::InvalidQuantity);
        }
        let restaurant = self
            .db
            .fetch_restaurant(restaurant_id)
            .await?
            .ok_or(OrderFlowError::RestaurantNotFound(restaurant_id))?;
        let mut resolved = Vec::with_capacity(items.len());
        for line in items {
            let item = self
                .db
                .fetch_menu_item(line.menu_item_id)
                .await?
                .ok_or(OrderFlowError::MenuItemNotFound(line.menu_item_id))?;
            if item.restaurant_id != restaurant_id {
                return Err(OrderFlowError::ItemFromOtherRestaurant { item_id: item.id, restaurant_id });
            }
            if !item.available {
                return Err(OrderFlowError::MenuItemUnavailable(item.name));
            }
            resolved.push(NewOrderItem {
                menu_item_id: item.id,
                name: item.name,
                unit_price: item.price,
                quantity: line.quantity,
            });
        }
        let total: Cents = resolved.iter().map(|i| i.unit_price * i.quantity).sum();
        trace!("🔄️🧾️ Priced {} line(s) for restaurant #{restaurant_id}. Total: {total}", resolved.len());
        Ok(PricedOrder { restaurant, items: resolved, total })
    }

    /// Stores a new order, along with all of its line items, in a single atomic transaction.
    ///
    /// By the time this is called the order has been priced and (for online payments) registered with the payment
    /// provider. If the provider call failed, this method is never reached and no local record exists.
    pub async fn place_order(&self, order: NewOrder) -> Result<OrderWithItems, OrderFlowError> {
        let user_id = order.user_id;
        let placed = self.db.insert_order(order).await?;
        debug!(
            "🔄️📦️ Order {} for user {user_id} placed. {} items, {} in total",
            placed.order.id,
            placed.items.len(),
            placed.order.total_amount
        );
        Ok(placed)
    }

    /// Marks the online order carrying `payment_ref` as paid.
    ///
    /// This is called after the provider signature has been verified, so reaching this method means the money is
    /// real. The call is idempotent: racing confirmations for the same reference each succeed, and each one fires
    /// the order-paid hook.
    pub async fn confirm_payment(&self, payment_ref: &str) -> Result<Order, OrderFlowError> {
        trace!("🔄️✅️ Payment for [{payment_ref}] is being marked as confirmed");
        let order = self.db.confirm_payment(payment_ref).await?;
        debug!("🔄️✅️ Order {} is paid ({})", order.id, order.total_amount);
        self.call_order_paid_hook(&order).await;
        Ok(order)
    }

    /// Changes the fulfilment status of an order.
    ///
    /// Orders move forward one step at a time, and any non-terminal order can be cancelled. The legal transitions
    /// are summarised in this table:
    ///
    /// | From \ To      | Accepted | Preparing | OutForDelivery | Delivered | Cancelled |
    /// |----------------|----------|-----------|----------------|-----------|-----------|
    /// | Placed         | Ok       | Err       | Err            | Err       | Ok        |
    /// | Accepted       | Err      | Ok        | Err            | Err       | Ok        |
    /// | Preparing      | Err      | Err       | Ok             | Err       | Ok        |
    /// | OutForDelivery | Err      | Err       | Err            | Ok        | Ok        |
    /// | Delivered      | Err      | Err      | Err            | Err       | Err       |
    /// | Cancelled      | Err      | Err      | Err            | Err       | Err       |
    ///
    /// Moving an order to the status it already has is a no-op and returns
    /// [`OrderFlowError::StatusChangeNoOp`]. `Delivered` and `Cancelled` are terminal. Every other rejected cell
    /// returns [`OrderFlowError::StatusChangeForbidden`].
    ///
    /// On success the status-changed hook fires once with the old and new status.
    ///
    /// ## Returns
    /// The updated order.
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order_by_id(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        let old_status = order.status;
        use OrderStatus::*;
        match (old_status, new_status) {
            (old, new) if old == new => return Err(OrderFlowError::StatusChangeNoOp),
            (Delivered | Cancelled, _) => return Err(OrderFlowError::StatusChangeForbidden),
            (Placed, Accepted) | (Accepted, Preparing) | (Preparing, OutForDelivery) | (OutForDelivery, Delivered) => {
            },
            (_, Cancelled) => {},
            (_, _) => return Err(OrderFlowError::StatusChangeForbidden),
        }
        let updated = self.db.set_order_status(order_id, new_status).await?;
        debug!("🔄️🚚️ Order {order_id} moved from {old_status} to {new_status}");
        self.call_status_changed_hook(&updated, old_status).await;
        Ok(updated)
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️📦️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_status_changed_hook(&self, order: &Order, old_status: OrderStatus) {
        for emitter in &self.producers.status_changed_producer {
            debug!("🔄️🚚️ Notifying status changed hook subscribers");
            let event = OrderStatusChangedEvent::new(order.clone(), old_status);
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
