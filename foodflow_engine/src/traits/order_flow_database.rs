use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    order_objects::OrderWithItems,
    traits::{AccountApiError, AccountManagement, CatalogApiError, CatalogManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the FoodFlow engine.
///
/// This behaviour includes:
/// * Atomically recording new orders along with their line items.
/// * Marking externally paid orders as settled.
/// * Moving orders through the fulfilment flow.
#[allow(async_fn_in_trait)]
pub trait OrderFlowDatabase: Clone + AccountManagement + CatalogManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a new order, and in a single atomic transaction, stores the order header and every line item in the
    /// database. If any insert fails, the entire order is rolled back.
    ///
    /// Returns the stored order together with its items.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderWithItems, OrderFlowError>;

    /// Marks the order carrying the given payment reference as paid, setting its payment status to `Paid`.
    ///
    /// Only orders placed with the `Online` payment method are candidates. Cash orders carry a sentinel reference
    /// and settle on delivery, so they can never be matched here.
    ///
    /// This call is idempotent. Confirming an already-paid order succeeds and returns the order unchanged apart
    /// from its `updated_at` timestamp.
    async fn confirm_payment(&self, payment_ref: &str) -> Result<Order, OrderFlowError>;

    /// Sets the fulfilment status for the given order and returns the updated record.
    ///
    /// This is a plain database write. Whether the transition is allowed is decided by the caller before this
    /// method is invoked.
    async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
    #[error("{0}")]
    CatalogError(#[from] CatalogApiError),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No online order carries the payment reference {0}")]
    PaymentRefNotFound(String),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Item quantities must be between 1 and 1000")]
    InvalidQuantity,
    #[error("The requested menu item {0} does not exist")]
    MenuItemNotFound(i64),
    #[error("The menu item '{0}' is not available right now")]
    MenuItemUnavailable(String),
    #[error("Menu item {item_id} does not belong to restaurant {restaurant_id}")]
    ItemFromOtherRestaurant { item_id: i64, restaurant_id: i64 },
    #[error("The requested restaurant {0} does not exist")]
    RestaurantNotFound(i64),
    #[error("The requested status change would result in a no-op.")]
    StatusChangeNoOp,
    #[error("The requested status change is forbidden.")]
    StatusChangeForbidden,
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
