use chrono::{serde::ts_seconds, DateTime, Utc};
use ff_common::Cents;
use serde::{Deserialize, Serialize};

/// Body of a provider order creation request. Amounts are in minor units.
#[derive(Debug, Clone, Serialize)]
pub struct NewRazorpayOrder {
    pub amount: Cents,
    pub currency: String,
    pub receipt: String,
}

/// A provider order, as returned by the `/v1/orders` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: Cents,
    pub amount_paid: Cents,
    pub amount_due: Cents,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub attempts: i64,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deserialize_provider_order() {
        let json = r#"{
          "id": "order_OZxEY6aSdBHLRA",
          "entity": "order",
          "amount": 25000,
          "amount_paid": 0,
          "amount_due": 25000,
          "currency": "INR",
          "receipt": "rcpt_h1XY0qqnLEAnT2ml",
          "status": "created",
          "attempts": 0,
          "notes": [],
          "created_at": 1582628071
        }"#;
        let order = serde_json::from_str::<RazorpayOrder>(json).expect("Failed to deserialize provider order");
        assert_eq!(order.id, "order_OZxEY6aSdBHLRA");
        assert_eq!(order.amount, Cents::from(25000));
        assert_eq!(order.amount_due, Cents::from(25000));
        assert_eq!(order.receipt.as_deref(), Some("rcpt_h1XY0qqnLEAnT2ml"));
        assert_eq!(order.status, "created");
        assert_eq!(order.created_at.timestamp(), 1582628071);
    }

    #[test]
    fn serialize_order_request() {
        let body = NewRazorpayOrder {
            amount: Cents::from(1999),
            currency: "INR".to_string(),
            receipt: "rcpt_0001".to_string(),
        };
        let json = serde_json::to_value(&body).expect("Failed to serialize order request");
        assert_eq!(json["amount"], 1999);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["receipt"], "rcpt_0001");
    }
}
