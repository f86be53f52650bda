//! FoodFlow Engine
//!
//! The FoodFlow engine contains the core logic of the food-ordering platform: orders, payments, user accounts and
//! the minimal restaurant catalog that order pricing needs. It is HTTP- and provider-agnostic; the storefront server
//! and the payment-provider client live in their own crates.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@traits`] and the SQLite backend). You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is the data types used in
//!    the database. These are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@ffe_api`]). This provides the public-facing functionality of the engine. It is
//!    responsible for placing orders, confirming payments, advancing order status, and managing accounts and roles.
//!    Specific backends need to implement the traits in [`mod@traits`] in order to act as a backend for the FoodFlow
//!    server.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when certain actions
//! occur, for example when an order is marked as paid, or when an order's status changes. A simple actor framework is
//! used so that you can easily hook into these events and perform custom actions.
mod ffe_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use ffe_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    catalog_api::CatalogApi,
    order_flow_api::{OrderFlowApi, MAX_LINE_QUANTITY},
    order_objects,
};
pub use traits::{
    AccountApiError,
    AccountManagement,
    AuthApiError,
    AuthManagement,
    CatalogApiError,
    CatalogManagement,
    OrderFlowDatabase,
    OrderFlowError,
};
