use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ff_common::{Cents, Secret};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// The sentinel payment reference recorded against cash-on-delivery orders. Online orders store the provider
/// order id here instead.
pub const COD_PAYMENT_REF: &str = "cod_order";

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------        OrderId        -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl FromStr for OrderId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self).map_err(|e| ConversionError(format!("Invalid order id: {s}. {e}")))
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------        UserId         -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------      OrderStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created. Nothing has happened to it yet.
    Placed,
    /// The restaurant has accepted the order.
    Accepted,
    /// The kitchen is working on the order.
    Preparing,
    /// The order has left the restaurant.
    OutForDelivery,
    /// The order has been delivered. Terminal.
    Delivered,
    /// The order has been cancelled by the user or an operator. Terminal.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Placed => write!(f, "Placed"),
            OrderStatus::Accepted => write!(f, "Accepted"),
            OrderStatus::Preparing => write!(f, "Preparing"),
            OrderStatus::OutForDelivery => write!(f, "OutForDelivery"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Placed" => Ok(Self::Placed),
            "Accepted" => Ok(Self::Accepted),
            "Preparing" => Ok(Self::Preparing),
            "OutForDelivery" | "Out for Delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Placed");
            OrderStatus::Placed
        })
    }
}

//--------------------------------------     PaymentStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No settlement has been recorded against the order yet.
    Pending,
    /// The payment has been confirmed.
    Paid,
    /// The payment attempt failed.
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------     PaymentMethod     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery. Settled offline, no provider involvement.
    Cod,
    /// Online settlement through the payment provider.
    Online,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "Cod"),
            PaymentMethod::Online => write!(f, "Online"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cod" | "cod" => Ok(Self::Cod),
            "Online" | "online" => Ok(Self::Online),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------         Role          -------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Role {
    /// A customer. Assigned to every account at registration.
    #[default]
    User,
    /// An operator who may advance orders of restaurants they own.
    RestaurantOwner,
    /// Full access, including role management.
    Admin,
}

pub type Roles = Vec<Role>;

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::RestaurantOwner => write!(f, "RestaurantOwner"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" | "user" => Ok(Self::User),
            "RestaurantOwner" | "restaurant_owner" => Ok(Self::RestaurantOwner),
            "Admin" | "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: i64,
    pub total_amount: Cents,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem        -------------------------------------------------------
/// A line of an order. Captured as a snapshot at checkout; catalog edits never touch it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    #[serde(rename = "menuItem")]
    pub menu_item_id: i64,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Cents,
    pub quantity: i64,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub restaurant_id: i64,
    /// The charge, recomputed server-side from catalog prices. Client totals are display hints only.
    pub total_amount: Cents,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    /// "cod_order" for offline orders, the provider order id for online ones.
    pub payment_ref: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: i64,
}

//--------------------------------------      Restaurant       -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    /// The operator account that may advance this restaurant's orders. `None` leaves it admin-only.
    pub owner_user_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub owner_user_id: Option<UserId>,
}

//--------------------------------------       MenuItem        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub price: Cents,
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub restaurant_id: i64,
    pub name: String,
    pub price: Cents,
    pub available: bool,
}

impl NewMenuItem {
    pub fn new<S: Into<String>>(restaurant_id: i64, name: S, price: Cents) -> Self {
        Self { restaurant_id, name: name.into(), price, available: true }
    }
}

//--------------------------------------      UserAccount      -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        NewUser        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
}

impl NewUser {
    pub fn new<S: Into<String>>(name: S, email: S, password: S) -> Self {
        Self { name: name.into(), email: email.into(), password: Secret::new(password.into()) }
    }
}
