//! Sqlite database operations for the restaurant catalogue.

use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{MenuItem, NewMenuItem, NewRestaurant, Restaurant},
    traits::CatalogApiError,
};

pub async fn fetch_restaurant(id: i64, conn: &mut SqliteConnection) -> Result<Option<Restaurant>, sqlx::Error> {
    let restaurant = sqlx::query_as("SELECT * FROM restaurants WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(restaurant)
}

pub async fn fetch_menu_item(id: i64, conn: &mut SqliteConnection) -> Result<Option<MenuItem>, sqlx::Error> {
    let item = sqlx::query_as("SELECT * FROM menu_items WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(item)
}

pub async fn fetch_menu_for_restaurant(
    restaurant_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<MenuItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM menu_items WHERE restaurant_id = $1 ORDER BY id")
        .bind(restaurant_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Inserts the restaurant, or updates the owner if a restaurant with the same name already exists.
pub async fn upsert_restaurant(
    restaurant: &NewRestaurant,
    conn: &mut SqliteConnection,
) -> Result<Restaurant, CatalogApiError> {
    let row: Restaurant = sqlx::query_as(
        r#"
            INSERT INTO restaurants (name, owner_user_id) VALUES ($1, $2)
            ON CONFLICT(name) DO UPDATE SET owner_user_id = excluded.owner_user_id
            RETURNING *;
        "#,
    )
    .bind(restaurant.name.as_str())
    .bind(restaurant.owner_user_id)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Restaurant '{}' stored with id {}", row.name, row.id);
    Ok(row)
}

/// Inserts the menu item, or updates price and availability if the restaurant already lists an item with the
/// same name.
pub async fn upsert_menu_item(item: &NewMenuItem, conn: &mut SqliteConnection) -> Result<MenuItem, CatalogApiError> {
    let row: MenuItem = sqlx::query_as(
        r#"
            INSERT INTO menu_items (restaurant_id, name, price, available) VALUES ($1, $2, $3, $4)
            ON CONFLICT(restaurant_id, name) DO UPDATE SET price = excluded.price, available = excluded.available
            RETURNING *;
        "#,
    )
    .bind(item.restaurant_id)
    .bind(item.name.as_str())
    .bind(item.price)
    .bind(item.available)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Menu item '{}' ({}) stored for restaurant #{}", row.name, row.price, row.restaurant_id);
    Ok(row)
}
