use thiserror::Error;

use crate::{
    db_types::{Order, OrderId, UserAccount, UserId},
    order_objects::OrderWithItems,
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait defines read behaviour for user accounts and the orders they own.
///
/// The [`OrderFlowDatabase`] trait handles the machinery of writing orders and payments; `AccountManagement`
/// provides methods for querying that information back out.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the user account for the given user id. If no account exists, `None` is returned.
    async fn fetch_user_account(&self, user_id: UserId) -> Result<Option<UserAccount>, AccountApiError>;

    /// Fetches the user account registered under the given email address, if any.
    async fn fetch_user_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;

    /// Fetches a bare order row by id.
    async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, AccountApiError>;

    /// Fetches an order together with its item snapshot.
    async fn fetch_order_with_items(&self, order_id: OrderId) -> Result<Option<OrderWithItems>, AccountApiError>;

    /// Fetches all orders for the given user, newest first, items included.
    async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, AccountApiError>;
}
