use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, UserId},
    traits::OrderFlowError,
};

/// Inserts a new order header into the database using the given connection. This is not atomic. You can embed this
/// call inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let inserted = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                restaurant_id,
                total_amount,
                delivery_address,
                payment_method,
                payment_ref
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.restaurant_id)
    .bind(order.total_amount)
    .bind(order.delivery_address.as_str())
    .bind(order.payment_method.to_string())
    .bind(order.payment_ref.as_str())
    .fetch_one(conn)
    .await?;
    Ok(inserted)
}

/// Inserts the line items for the given order, returning the stored rows. Like [`insert_order`], callers are
/// expected to run this inside the same transaction as the header insert.
pub async fn insert_order_items(
    order_id: OrderId,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, OrderFlowError> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as(
            r#"
            INSERT INTO order_items (order_id, menu_item_id, name, unit_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.name.as_str())
        .bind(item.unit_price)
        .bind(item.quantity)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }
    debug!("📝️ {} line item(s) inserted for order {order_id}", rows.len());
    Ok(rows)
}

pub async fn fetch_order_by_id(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_items_for_order(
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Fetches the order headers for the given user, newest first. Orders created in the same second keep a stable
/// order by falling back to the insertion id.
pub async fn fetch_orders_for_user(user_id: UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Marks the online order carrying `payment_ref` as paid, returning the updated row.
///
/// The match deliberately filters on the payment method so that cash orders (which all share the same sentinel
/// reference) can never be settled through this path. Re-running the update on an already-paid order succeeds,
/// which makes the call idempotent.
pub async fn confirm_payment(payment_ref: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let method = PaymentMethod::Online.to_string();
    let order: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_status = 'Paid', updated_at = CURRENT_TIMESTAMP WHERE payment_ref = $1 AND \
         payment_method = $2 RETURNING *",
    )
    .bind(payment_ref)
    .bind(method)
    .fetch_optional(conn)
    .await?;
    if let Some(o) = &order {
        debug!("📝️ Order {} marked as paid against reference [{payment_ref}]", o.id);
    }
    Ok(order)
}

pub(crate) async fn update_order_status(
    id: OrderId,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let status = status.to_string();
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(OrderFlowError::OrderNotFound(id))
}
