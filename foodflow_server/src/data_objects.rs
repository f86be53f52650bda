use foodflow_engine::{
    db_types::{OrderStatus, PaymentMethod, Role},
    order_objects::{LineItemRequest, OrderWithItems},
};
use razorpay_tools::RazorpayOrder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// The checkout request body. `total_amount` is only a client-side hint; the server reprices every line item
/// against the live menu and charges the recomputed total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub restaurant: i64,
    pub items: Vec<LineItemRequest>,
    pub total_amount: f64,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerificationRequest {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateRequest {
    pub email: String,
    #[serde(default)]
    pub apply: Vec<Role>,
    #[serde(default)]
    pub revoke: Vec<Role>,
}

/// The response to a successful checkout. Cash orders complete immediately, while online orders carry the
/// provider order that the client must settle before the kitchen sees the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckoutResponse {
    Cod {
        order: OrderWithItems,
    },
    Online {
        order: OrderWithItems,
        #[serde(rename = "providerOrder")]
        provider_order: RazorpayOrder,
        key_id: String,
    },
}
