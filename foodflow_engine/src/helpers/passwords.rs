//! # Password storage format
//!
//! Passwords are never stored. What is stored is `{salt}${digest}`, where `salt` is a fresh random alphanumeric
//! string and `digest` is the hex-encoded `Blake2b512` hash of the salt followed by the password. Verification
//! splits the stored value at the first `$`, recomputes the digest with the stored salt, and compares.

use blake2::{Blake2b512, Digest};
use rand::{distributions::Alphanumeric, Rng};

const SALT_LENGTH: usize = 16;

/// Hashes a password with a freshly generated salt, returning the `{salt}${digest}` storage form.
pub fn create_password_hash(password: &str) -> String {
    let salt: String = rand::thread_rng().sample_iter(&Alphanumeric).take(SALT_LENGTH).map(char::from).collect();
    let digest = salted_digest(&salt, password);
    format!("{salt}${digest}")
}

/// Checks a password attempt against a stored `{salt}${digest}` value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => salted_digest(salt, password) == digest,
        None => false,
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Blake2b512::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
