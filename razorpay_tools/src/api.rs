use std::sync::Arc;

use ff_common::Cents;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{config::RazorpayConfig, data_objects::NewRazorpayOrder, RazorpayApiError, RazorpayOrder};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// The public half of the API key pair. Checkout pages need it to open the payment widget.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
            // Provider errors arrive as {"error": {"code": .., "description": ..}}
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"]["description"].as_str().map(String::from))
                .unwrap_or(body);
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    /// Creates a provider order for `amount`. The returned order id is what ties a later payment callback
    /// back to the local order.
    pub async fn create_order(&self, amount: Cents, receipt: String) -> Result<RazorpayOrder, RazorpayApiError> {
        let body = NewRazorpayOrder { amount, currency: self.config.currency.clone(), receipt };
        debug!("Creating provider order for {amount}");
        let order = self.rest_query::<RazorpayOrder, _>(Method::POST, "/orders", Some(&body)).await?;
        info!("Created provider order {} for {amount}", order.id);
        Ok(order)
    }
}
