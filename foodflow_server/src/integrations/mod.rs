//! Glue between the storefront server and external services.
pub mod razorpay;
