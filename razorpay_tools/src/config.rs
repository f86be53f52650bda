use ff_common::Secret;
use log::*;

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub api_url: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub currency: String,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.razorpay.com".to_string(),
            key_id: "rzp_test_0000000000".to_string(),
            key_secret: Secret::default(),
            currency: "INR".to_string(),
        }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("FF_RAZORPAY_API_URL").unwrap_or_else(|_| "https://api.razorpay.com".to_string());
        let key_id = std::env::var("FF_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("FF_RAZORPAY_KEY_ID not set, using a (probably useless) default");
            "rzp_test_0000000000".to_string()
        });
        let key_secret = Secret::new(std::env::var("FF_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("FF_RAZORPAY_KEY_SECRET not set, using a (probably useless) default");
            "00000000000000".to_string()
        }));
        let currency = std::env::var("FF_RAZORPAY_CURRENCY").unwrap_or_else(|_| "INR".to_string());
        Self { api_url, key_id, key_secret, currency }
    }
}
