use ff_common::Cents;
use razorpay_tools::{helpers, RazorpayApi, RazorpayApiError, RazorpayConfig, RazorpayOrder};

/// The slice of the payment provider that checkout and verification need. Keeping it a trait lets the endpoint
/// tests run against a mock instead of the live REST API.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Registers a new order with the provider for the given amount and returns the provider's order record.
    async fn create_order(&self, amount: Cents, receipt: String) -> Result<RazorpayOrder, RazorpayApiError>;
    /// The public half of the provider API key pair.
    fn key_id(&self) -> &str;
    /// Checks a payment signature posted by the checkout page against the one recomputed with the key secret.
    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

#[derive(Clone)]
pub struct RazorpayProvider {
    api: RazorpayApi,
    config: RazorpayConfig,
}

impl RazorpayProvider {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let api = RazorpayApi::new(config.clone())?;
        Ok(Self { api, config })
    }
}

impl PaymentProvider for RazorpayProvider {
    async fn create_order(&self, amount: Cents, receipt: String) -> Result<RazorpayOrder, RazorpayApiError> {
        self.api.create_order(amount, receipt).await
    }

    fn key_id(&self) -> &str {
        self.api.key_id()
    }

    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        helpers::verify_payment_signature(self.config.key_secret.reveal(), order_id, payment_id, signature)
    }
}
