//! `SqliteDatabase` is a concrete implementation of a FoodFlow engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{auth, catalog, db_url, new_pool, orders, user_accounts};
use crate::{
    db_types::{
        MenuItem,
        NewMenuItem,
        NewOrder,
        NewRestaurant,
        NewUser,
        Order,
        OrderId,
        OrderStatus,
        Restaurant,
        Role,
        Roles,
        UserAccount,
        UserId,
    },
    helpers::verify_password,
    order_objects::OrderWithItems,
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        CatalogApiError,
        CatalogManagement,
        OrderFlowDatabase,
        OrderFlowError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderFlowDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<OrderWithItems, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let header = orders::insert_order(&order, &mut tx).await?;
        let items = orders::insert_order_items(header.id, &order.items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB with {} item(s)", header.id, items.len());
        Ok(OrderWithItems::new(header, items))
    }

    async fn confirm_payment(&self, payment_ref: &str) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::confirm_payment(payment_ref, &mut conn).await?;
        order.ok_or_else(|| OrderFlowError::PaymentRefNotFound(payment_ref.to_string()))
    }

    async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn).await?;
        debug!("🗃️ Order {order_id} status set to {status}");
        Ok(order)
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_account(&self, user_id: UserId) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = user_accounts::user_by_id(user_id, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_user_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = user_accounts::user_by_email(email, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_with_items(&self, order_id: OrderId) -> Result<Option<OrderWithItems>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order_by_id(order_id, &mut conn).await? {
            Some(o) => o,
            None => return Ok(None),
        };
        let items = orders::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(Some(OrderWithItems::new(order, items)))
    }

    async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let headers = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        let mut result = Vec::with_capacity(headers.len());
        for order in headers {
            let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
            result.push(OrderWithItems::new(order, items));
        }
        Ok(result)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_restaurant(&self, restaurant_id: i64) -> Result<Option<Restaurant>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let restaurant = catalog::fetch_restaurant(restaurant_id, &mut conn).await?;
        Ok(restaurant)
    }

    async fn fetch_menu_item(&self, menu_item_id: i64) -> Result<Option<MenuItem>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let item = catalog::fetch_menu_item(menu_item_id, &mut conn).await?;
        Ok(item)
    }

    async fn fetch_menu_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<MenuItem>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = catalog::fetch_menu_for_restaurant(restaurant_id, &mut conn).await?;
        Ok(items)
    }

    async fn upsert_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::upsert_restaurant(&restaurant, &mut conn).await
    }

    async fn upsert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::upsert_menu_item(&item, &mut conn).await
    }
}

impl AuthManagement for SqliteDatabase {
    /// Registers the user and assigns the default `User` role in a single transaction.
    async fn register_user(&self, user: NewUser) -> Result<UserAccount, AuthApiError> {
        let mut tx = self.pool.begin().await?;
        if user_accounts::user_by_email(&user.email, &mut tx).await?.is_some() {
            return Err(AuthApiError::EmailAlreadyInUse);
        }
        let account = user_accounts::insert_user(&user, &mut tx).await?;
        auth::assign_roles(account.id, &[Role::User], &mut tx).await?;
        tx.commit().await?;
        debug!("🔑️ New account {} registered for {}", account.id, account.email);
        Ok(account)
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<UserAccount, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        // Unknown email and wrong password produce the same error, so callers learn nothing about which it was.
        let account = user_accounts::user_by_email(email, &mut conn)
            .await?
            .ok_or(AuthApiError::InvalidCredentials)?;
        if !verify_password(password, &account.password_hash) {
            return Err(AuthApiError::InvalidCredentials);
        }
        Ok(account)
    }

    async fn fetch_roles_for_user(&self, user_id: UserId) -> Result<Roles, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        auth::roles_for_user(user_id, &mut conn).await
    }

    async fn check_user_has_roles(&self, user_id: UserId, roles: &[Role]) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        auth::user_has_roles(user_id, roles, &mut conn).await
    }

    async fn assign_roles(&self, email: &str, roles: &[Role]) -> Result<(), AuthApiError> {
        let mut tx = self.pool.begin().await?;
        let account = user_accounts::user_by_email(email, &mut tx).await?.ok_or(AuthApiError::UserNotFound)?;
        auth::assign_roles(account.id, roles, &mut tx).await?;
        tx.commit().await?;
        debug!("🔑️ Roles {roles:?} assigned to {email}");
        Ok(())
    }

    async fn remove_roles(&self, email: &str, roles: &[Role]) -> Result<u64, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = user_accounts::user_by_email(email, &mut conn).await?.ok_or(AuthApiError::UserNotFound)?;
        let removed = auth::remove_roles(account.id, roles, &mut conn).await?;
        debug!("🔑️ {removed} role(s) removed from {email}");
        Ok(removed)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database file if it does not exist yet. A no-op for existing databases.
    pub async fn create_database_if_missing(url: &str) -> Result<(), sqlx::Error> {
        use sqlx::migrate::MigrateDatabase;
        if !sqlx::Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("🗃️ Database {url} does not exist. Creating it.");
            sqlx::Sqlite::create_database(url).await?;
        }
        Ok(())
    }

    /// Runs the schema migrations embedded in this crate against the connected database.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await.map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        Ok(())
    }
}
