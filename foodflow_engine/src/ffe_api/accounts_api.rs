//! Unifies API for accessing accounts and order history.

use std::fmt::Debug;

use crate::{
    db_types::{Order, OrderId, UserAccount, UserId},
    order_objects::OrderWithItems,
    traits::{AccountApiError, AccountManagement},
};

/// The `AccountApi` provides a unified API for accessing accounts and their order histories.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the user account for the given user id. If no account exists, `None` is returned.
    pub async fn account_by_id(&self, user_id: UserId) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account(user_id).await
    }

    /// Fetches the user account registered under the given email address.
    pub async fn account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account_by_email(email).await
    }

    pub async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_id(order_id).await
    }

    /// Fetches a single order together with its line items.
    pub async fn fetch_order_with_items(&self, order_id: OrderId) -> Result<Option<OrderWithItems>, AccountApiError> {
        self.db.fetch_order_with_items(order_id).await
    }

    /// Fetches the order history for the given user, newest orders first, with line items included.
    pub async fn order_history(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, AccountApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }
}
