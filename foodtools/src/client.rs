use anyhow::{anyhow, Result};
use foodflow_engine::{
    db_types::{MenuItem, OrderStatus},
    order_objects::OrderWithItems,
};
use foodflow_server::{
    auth::ACCESS_TOKEN_NAME,
    data_objects::{
        CheckoutResponse,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        NewOrderRequest,
        PaymentVerificationRequest,
        RegisterRequest,
        RoleUpdateRequest,
        UpdateStatusRequest,
    },
};
use log::info;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    RequestBuilder,
    Response,
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::profile_manager::Profile;

pub struct StorefrontClient {
    client: Client,
    profile: Profile,
}

impl StorefrontClient {
    pub fn new(profile: Profile) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("FoodFlow Storefront Client")
            .default_headers(headers)
            .build()
            .expect("Failed to create reqwest client");
        StorefrontClient { client, profile }
    }

    pub fn server(&self) -> &str {
        self.profile.server.as_str()
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.profile.server)?;
        base.join(path).map_err(|e| anyhow!("Failed to join URL: {}", e))
    }

    /// Adds the access token to a request. Every `/api` call needs it; the token comes from the profile and is
    /// injected per request rather than stored on the client.
    fn with_token(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token =
            self.profile.access_token.as_ref().ok_or_else(|| anyhow!("Not logged in. Run `foodtools login` first."))?;
        Ok(req.header(ACCESS_TOKEN_NAME, token.clone()))
    }

    pub async fn health(&self) -> Result<String> {
        let url = self.url("/health")?;
        let res = self.client.get(url).send().await?;
        Ok(res.text().await?)
    }

    pub async fn register(&self, name: String, email: String, password: String) -> Result<()> {
        let url = self.url("/auth/register")?;
        let body = RegisterRequest { name, email, password };
        let res = self.client.post(url).json(&body).send().await?;
        if !res.status().is_success() {
            let reason = res.text().await?;
            return Err(anyhow!("Registration failed. {reason}"));
        }
        Ok(())
    }

    /// Logs in and returns the access token. The caller is responsible for persisting it in the profile.
    pub async fn login(&self, email: String, password: String) -> Result<String> {
        let url = self.url("/auth/login")?;
        let body = LoginRequest { email, password };
        let res = self.client.post(url).json(&body).send().await?;
        if !res.status().is_success() {
            let reason = res.text().await?;
            return Err(anyhow!("Login failed. {reason}"));
        }
        let response: LoginResponse = res.json().await?;
        info!("🔑️ Logged in. Access token: {}******", &response.token[..12.min(response.token.len())]);
        Ok(response.token)
    }

    pub async fn menu(&self, restaurant_id: i64) -> Result<Vec<MenuItem>> {
        let url = self.url(&format!("/api/restaurants/{restaurant_id}/menu"))?;
        let res = self.with_token(self.client.get(url))?.send().await?;
        json_or_error(res).await
    }

    pub async fn checkout(&self, order: &NewOrderRequest) -> Result<CheckoutResponse> {
        let url = self.url("/api/orders")?;
        let res = self.with_token(self.client.post(url))?.json(order).send().await?;
        json_or_error(res).await
    }

    pub async fn verify_payment(&self, verification: &PaymentVerificationRequest) -> Result<JsonResponse> {
        let url = self.url("/api/orders/verify")?;
        let res = self.with_token(self.client.post(url))?.json(verification).send().await?;
        // The verify endpoint speaks JsonResponse on success and failure alike
        Ok(res.json().await?)
    }

    pub async fn my_orders(&self) -> Result<Vec<OrderWithItems>> {
        let url = self.url("/api/orders")?;
        let res = self.with_token(self.client.get(url))?.send().await?;
        json_or_error(res).await
    }

    pub async fn order(&self, order_id: i64) -> Result<OrderWithItems> {
        let url = self.url(&format!("/api/orders/{order_id}"))?;
        let res = self.with_token(self.client.get(url))?.send().await?;
        json_or_error(res).await
    }

    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<serde_json::Value> {
        let url = self.url(&format!("/api/orders/{order_id}/status"))?;
        let body = UpdateStatusRequest { status };
        let res = self.with_token(self.client.put(url))?.json(&body).send().await?;
        json_or_error(res).await
    }

    pub async fn update_roles(&self, updates: &[RoleUpdateRequest]) -> Result<JsonResponse> {
        let url = self.url("/api/roles")?;
        let res = self.with_token(self.client.post(url))?.json(&updates).send().await?;
        json_or_error(res).await
    }

    /// Opens the SSE stream of order status updates. The returned response body yields raw event frames.
    pub async fn order_events(&self) -> Result<Response> {
        let url = self.url("/api/orders/events")?;
        let res = self.with_token(self.client.get(url))?.send().await?;
        if !res.status().is_success() {
            let reason = res.text().await?;
            return Err(anyhow!("Could not open the event stream. {reason}"));
        }
        Ok(res)
    }
}

async fn json_or_error<T: DeserializeOwned>(res: Response) -> Result<T> {
    if res.status().is_success() {
        Ok(res.json().await?)
    } else {
        let status = res.status();
        let reason = res.text().await?;
        Err(anyhow!("Server returned {status}. {reason}"))
    }
}
