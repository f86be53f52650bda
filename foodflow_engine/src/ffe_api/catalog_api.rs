//! API for reading and maintaining the restaurant catalogue.

use std::fmt::Debug;

use crate::{
    db_types::{MenuItem, NewMenuItem, NewRestaurant, Restaurant},
    traits::{CatalogApiError, CatalogManagement},
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn fetch_restaurant(&self, restaurant_id: i64) -> Result<Option<Restaurant>, CatalogApiError> {
        self.db.fetch_restaurant(restaurant_id).await
    }

    /// Fetches the full menu for a restaurant, including items currently marked unavailable. Clients use the
    /// `available` flag to grey items out rather than hide them.
    pub async fn menu_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<MenuItem>, CatalogApiError> {
        self.db.fetch_menu_for_restaurant(restaurant_id).await
    }

    pub async fn upsert_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, CatalogApiError> {
        self.db.upsert_restaurant(restaurant).await
    }

    pub async fn upsert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, CatalogApiError> {
        self.db.upsert_menu_item(item).await
    }
}
