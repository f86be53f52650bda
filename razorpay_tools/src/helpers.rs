//! # Payment signature format
//!
//! When an online payment completes, the checkout page posts `{providerOrderId, providerPaymentId, signature}`
//! back to the storefront. The provider computes the signature on its servers as
//!
//! ```text
//!     signature = hex( HMAC-SHA256( key_secret, "{order_id}|{payment_id}" ) )
//! ```
//!
//! i.e. the HMAC over the provider order id and the payment id joined by a single `|`, keyed with the API key
//! secret, hex-encoded in lowercase. Verification recomputes the digest from the posted ids and accepts the
//! payment iff it matches the posted signature exactly. The key secret never leaves the server, so a matching
//! signature is proof that the provider processed a payment for exactly this provider order.

use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The message that a payment signature covers.
pub fn signature_message(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Computes the hex-encoded payment signature for a provider order id and payment id pair.
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(signature_message(order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks a posted payment signature against the one recomputed from the posted ids.
pub fn verify_payment_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    payment_signature(secret, order_id, payment_id) == signature
}

/// Generates a fresh receipt id for a provider order.
pub fn new_receipt_id() -> String {
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(16).map(char::from).collect();
    format!("rcpt_{suffix}")
}
