//! SQLite database module for the FoodFlow engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
