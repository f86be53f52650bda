mod passwords;

pub use passwords::{create_password_hash, verify_password};
