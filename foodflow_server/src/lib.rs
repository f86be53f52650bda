//! # FoodFlow server
//!
//! The HTTP face of the FoodFlow ordering platform. It is responsible for:
//! * Registration and login, issuing JWT access tokens for every other call.
//! * The checkout endpoint, which prices carts against the live menu, branches between cash-on-delivery and online
//!   payment, and registers provider orders for the latter.
//! * Verifying payment-provider callbacks against their HMAC signature before marking orders as paid.
//! * Advancing orders through the fulfilment flow, gated by operator capabilities.
//! * Streaming order-status transitions to the owning user's connected sessions over SSE.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! All business logic lives in the `foodflow_engine` crate; this crate only maps HTTP onto the engine APIs and
//! enforces who may call what.

#![feature(type_alias_impl_trait)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod sse;

#[cfg(test)]
mod endpoint_tests;
