//! # FoodFlow engine public API
//!
//! The `ffe_api` module exposes the programmatic API for the FoodFlow engine.
//! The API is modular, so that clients of the API can pick and choose the functionality they want.
//! Or different parts (e.g. auth and orders) could be configured on different machines.
//!
//! * [`accounts_api`] provides methods for interacting with user accounts, including fetching order histories.
//! * [`auth_api`] manages registration, credential checks, and user [`crate::db_types::Role`]s.
//! * [`catalog_api`] provides read and maintenance access to restaurants and their menus.
//! * [`order_flow_api`] is the primary API for handling order and payment flows: pricing carts against the menu,
//!   placing orders, confirming provider payments, and advancing fulfilment status.
//!
//! The other submodules in this module are support and utility functions and types.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
//!
//! For example, to create an API instance to query accounts on the database:
//!
//! ```rust,ignore
//! use foodflow_engine::{AccountApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements AccountManagement
//! let api = AccountApi::new(db);
//! // use the api to access information
//! let account = api.account_by_id(user_id).await?;
//! ```

pub mod accounts_api;
pub mod auth_api;
pub mod catalog_api;
pub mod order_flow_api;
pub mod order_objects;
