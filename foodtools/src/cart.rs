//! The client-side cart.
//!
//! A cart only ever holds items from a single restaurant, and every mutation is written straight back to disk
//! under the current identity's file. Guests get their own cart file; logging in hands the guest cart over to
//! the user via [`merge_carts`].

use std::{fs, path::PathBuf};

use ff_common::Cents;
use foodflow_engine::{db_types::UserId, order_objects::LineItemRequest};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile_manager::{config_dir, set_permissions};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("The cart already holds items from restaurant #{current}. Replace it to order from #{incoming}.")]
    RestaurantConflict { current: i64, incoming: i64 },
    #[error("I/O error accessing the cart file. {0}")]
    IOError(#[from] std::io::Error),
    #[error("The cart file is corrupt. {0}")]
    CorruptCart(String),
}

/// The cart partition key. Guests share one anonymous cart file; each user gets their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartIdentity {
    Guest,
    User(UserId),
}

impl CartIdentity {
    fn file_name(&self) -> String {
        match self {
            CartIdentity::Guest => "cart_guest.toml".to_string(),
            CartIdentity::User(id) => format!("cart_user_{}.toml", id.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Set iff the cart is non-empty. All items belong to this restaurant.
    pub restaurant: Option<i64>,
    pub items: Vec<CartLine>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a line to the cart, merging quantities for repeated items. Fails with a conflict when the cart
    /// already belongs to another restaurant; the caller decides whether to [`Cart::replace_with`].
    pub fn add_item(&mut self, restaurant: i64, line: CartLine) -> Result<(), CartError> {
        if let Some(current) = self.restaurant {
            if current != restaurant && !self.is_empty() {
                return Err(CartError::RestaurantConflict { current, incoming: restaurant });
            }
        }
        match self.items.iter_mut().find(|l| l.menu_item_id == line.menu_item_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => self.items.push(line),
        }
        self.restaurant = Some(restaurant);
        Ok(())
    }

    /// Discards the current cart and starts a new one under the incoming restaurant.
    pub fn replace_with(&mut self, restaurant: i64, line: CartLine) {
        self.items.clear();
        self.items.push(line);
        self.restaurant = Some(restaurant);
    }

    pub fn remove_item(&mut self, menu_item_id: i64) {
        self.items.retain(|l| l.menu_item_id != menu_item_id);
        if self.items.is_empty() {
            self.restaurant = None;
        }
    }

    pub fn set_quantity(&mut self, menu_item_id: i64, quantity: i64) {
        if quantity < 1 {
            self.remove_item(menu_item_id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|l| l.menu_item_id == menu_item_id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.restaurant = None;
    }

    pub fn total(&self) -> Cents {
        self.items.iter().map(|l| l.unit_price * l.quantity).sum()
    }

    /// The cart lines in the shape the checkout endpoint expects.
    pub fn as_line_items(&self) -> Vec<LineItemRequest> {
        self.items.iter().map(|l| LineItemRequest::new(l.menu_item_id, l.quantity)).collect()
    }
}

/// The guest-to-user cart handover. A non-empty guest cart replaces the user's saved cart wholesale. There is
/// no item-level union; whatever the guest just built is what they expect to check out with.
pub fn merge_carts(guest: Cart, user: Cart) -> Cart {
    if guest.is_empty() {
        user
    } else {
        guest
    }
}

/// File-backed cart storage in the foodtools config directory. One file per identity, rewritten in full on
/// every mutation.
pub struct CartStore {
    dir: PathBuf,
}

impl CartStore {
    pub fn new() -> Result<Self, CartError> {
        Ok(Self { dir: config_dir()? })
    }

    #[cfg(test)]
    fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, identity: CartIdentity) -> PathBuf {
        self.dir.join(identity.file_name())
    }

    pub fn load(&self, identity: CartIdentity) -> Result<Cart, CartError> {
        let path = self.path_for(identity);
        if !path.exists() {
            return Ok(Cart::default());
        }
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| CartError::CorruptCart(e.to_string()))
    }

    pub fn save(&self, identity: CartIdentity, cart: &Cart) -> Result<(), CartError> {
        let path = self.path_for(identity);
        let raw = toml::to_string(cart).map_err(|e| CartError::CorruptCart(e.to_string()))?;
        fs::write(&path, raw)?;
        set_permissions(&path, 0o600)?;
        debug!("🛒️ Cart written to {}", path.display());
        Ok(())
    }

    pub fn purge(&self, identity: CartIdentity) -> Result<(), CartError> {
        let path = self.path_for(identity);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Runs the identity-merge protocol for a fresh login. The guest cart, if any, replaces the user's cart
    /// and the guest file is purged so the merge cannot run twice.
    pub fn adopt_guest_cart(&self, user_id: UserId) -> Result<Cart, CartError> {
        let guest = self.load(CartIdentity::Guest)?;
        let user = self.load(CartIdentity::User(user_id))?;
        let merged = merge_carts(guest, user);
        self.save(CartIdentity::User(user_id), &merged)?;
        self.purge(CartIdentity::Guest)?;
        Ok(merged)
    }
}
