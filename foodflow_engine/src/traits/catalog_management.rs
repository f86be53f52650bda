use thiserror::Error;

use crate::db_types::{MenuItem, NewMenuItem, NewRestaurant, Restaurant};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// The `CatalogManagement` trait defines behaviour for reading and maintaining the restaurant catalogue, which is
/// the source of truth for menu pricing.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the restaurant with the given id, or `None` if it does not exist.
    async fn fetch_restaurant(&self, restaurant_id: i64) -> Result<Option<Restaurant>, CatalogApiError>;

    /// Fetches a single menu item by id, or `None` if it does not exist.
    async fn fetch_menu_item(&self, menu_item_id: i64) -> Result<Option<MenuItem>, CatalogApiError>;

    /// Fetches every menu item for the given restaurant, including items currently marked unavailable.
    async fn fetch_menu_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<MenuItem>, CatalogApiError>;

    /// Creates the restaurant, or updates its details if one with the same name already exists.
    async fn upsert_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, CatalogApiError>;

    /// Creates the menu item, or updates price and availability if the restaurant already lists an item with the
    /// same name.
    async fn upsert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, CatalogApiError>;
}
