//! # Database management and control.
//!
//! This module defines the interface contracts that the engine's database *backends* must expose.
//!
//! ## Traits
//! * [`OrderFlowDatabase`] defines the highest level of behaviour for backends supporting the engine: order
//!   placement, payment confirmation and status writes.
//! * [`AccountManagement`] provides methods for querying information about user accounts and their orders.
//! * [`AuthManagement`] defines behaviour for registration, credential checks and role management.
//! * [`CatalogManagement`] covers the minimal restaurant catalog the order flow needs for pricing.
mod account_management;
mod auth_management;
mod catalog_management;
mod order_flow_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use order_flow_database::{OrderFlowDatabase, OrderFlowError};
