use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Days, TimeZone, Utc};
use ff_common::Cents;
use foodflow_engine::{
    db_types::{
        MenuItem,
        Order,
        OrderId,
        OrderItem,
        OrderStatus,
        PaymentMethod,
        PaymentStatus,
        Restaurant,
        Role,
        UserId,
        COD_PAYMENT_REF,
    },
    events::EventProducers,
    order_objects::OrderWithItems,
    traits::OrderFlowError,
    OrderFlowApi,
};
use razorpay_tools::RazorpayOrder;
use serde_json::json;

use super::{
    helpers::{issue_token, post_request},
    mocks::{MockBackend, MockProvider},
};
use crate::{
    auth::JwtClaims,
    routes::{CreateOrderRoute, VerifyPaymentRoute},
};

const PROVIDER_ORDER_ID: &str = "order_OZxEY6aSdBHLRA";

fn valid_token() -> String {
    issue_token(
        JwtClaims { user_id: UserId(1), email: "alice@example.com".to_string(), roles: vec![Role::User] },
        Utc::now() + Days::new(1),
    )
}

fn checkout_body(payment_method: &str) -> serde_json::Value {
    json!({
        "restaurant": 5,
        "items": [{"menuItem": 11, "quantity": 2}],
        "totalAmount": 250.0,
        "deliveryAddress": "12 Main Rd",
        "paymentMethod": payment_method,
    })
}

#[actix_web::test]
async fn cod_checkout_never_touches_the_provider() {
    let _ = env_logger::try_init().ok();
    let body = checkout_body("cod");
    let (status, body) =
        post_request(&valid_token(), "/orders", &body, configure_cod_checkout).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let res = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(res["type"], "cod");
    assert_eq!(res["order"]["paymentRef"], COD_PAYMENT_REF);
    assert_eq!(res["order"]["totalAmount"], 25000);
    assert!(res.get("providerOrder").is_none());
}

#[actix_web::test]
async fn online_checkout_charges_the_recomputed_total() {
    let _ = env_logger::try_init().ok();
    // The client claims a much cheaper order. The provider must be charged the recomputed 25000, not 1.
    let mut body = checkout_body("online");
    body["totalAmount"] = json!(0.01);
    let (status, body) =
        post_request(&valid_token(), "/orders", &body, configure_online_checkout).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let res = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(res["type"], "online");
    assert_eq!(res["order"]["paymentRef"], PROVIDER_ORDER_ID);
    assert_eq!(res["providerOrder"]["id"], PROVIDER_ORDER_ID);
    assert_eq!(res["key_id"], "rzp_test_1234567890");
}

#[actix_web::test]
async fn failed_provider_order_is_a_bad_gateway_and_stores_nothing() {
    let _ = env_logger::try_init().ok();
    let body = checkout_body("online");
    let (status, body) =
        post_request(&valid_token(), "/orders", &body, configure_provider_outage).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Could not create a payment order with the provider"), "was: {body}");
}

#[actix_web::test]
async fn unknown_menu_item_is_not_found() {
    let _ = env_logger::try_init().ok();
    let body = checkout_body("cod");
    let (status, body) =
        post_request(&valid_token(), "/orders", &body, configure_missing_item).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("menu item 11 does not exist"), "was: {body}");
}

#[actix_web::test]
async fn valid_signature_confirms_the_payment() {
    let _ = env_logger::try_init().ok();
    let body = verification_body("a-signature-the-mock-accepts");
    let (status, body) =
        post_request(&valid_token(), "/orders/verify", &body, configure_verification).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK, "was: {body}");
    assert_eq!(body, r#"{"success":true,"message":"Payment verified"}"#);
}

#[actix_web::test]
async fn tampered_signature_is_rejected_before_the_database() {
    let _ = env_logger::try_init().ok();
    let body = verification_body("bad");
    let (status, body) =
        post_request(&valid_token(), "/orders/verify", &body, configure_verification).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"success":false,"message":"Invalid payment signature"}"#);
}

#[actix_web::test]
async fn unknown_payment_reference_is_not_found() {
    let _ = env_logger::try_init().ok();
    let body = verification_body("a-signature-the-mock-accepts");
    let (status, body) =
        post_request(&valid_token(), "/orders/verify", &body, configure_unknown_reference).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"success":false,"message":"No order matches this payment"}"#);
}

fn verification_body(signature: &str) -> serde_json::Value {
    json!({
        "providerOrderId": PROVIDER_ORDER_ID,
        "providerPaymentId": "pay_OZxFbYtLbpYqSy",
        "signature": signature,
    })
}

//----------------------------------------------   Fixtures  ----------------------------------------------------

fn catalog_backend() -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_fetch_restaurant().returning(|_| {
        Ok(Some(Restaurant { id: 5, name: "Pizza Palace".to_string(), owner_user_id: Some(UserId(40)) }))
    });
    backend.expect_fetch_menu_item().returning(|id| {
        Ok(Some(MenuItem {
            id,
            restaurant_id: 5,
            name: "Margherita".to_string(),
            price: Cents::from_whole(125),
            available: true,
        }))
    });
    backend
}

fn placed_order(payment_method: PaymentMethod, payment_ref: &str) -> OrderWithItems {
    let order = Order {
        id: OrderId(1),
        user_id: UserId(1),
        restaurant_id: 5,
        total_amount: Cents::from_whole(250),
        delivery_address: "12 Main Rd".to_string(),
        status: OrderStatus::Placed,
        payment_status: PaymentStatus::Pending,
        payment_method,
        payment_ref: payment_ref.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    };
    let items = vec![OrderItem {
        id: 1,
        order_id: OrderId(1),
        menu_item_id: 11,
        name: "Margherita".to_string(),
        unit_price: Cents::from_whole(125),
        quantity: 2,
    }];
    OrderWithItems::new(order, items)
}

fn provider_order() -> RazorpayOrder {
    RazorpayOrder {
        id: PROVIDER_ORDER_ID.to_string(),
        amount: Cents::from_whole(250),
        amount_paid: Cents::from_whole(0),
        amount_due: Cents::from_whole(250),
        currency: "INR".to_string(),
        receipt: Some("rcpt_test".to_string()),
        status: "created".to_string(),
        attempts: 0,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn configure_cod_checkout(cfg: &mut ServiceConfig) {
    let mut backend = catalog_backend();
    backend.expect_insert_order().withf(|order| {
        order.payment_ref == COD_PAYMENT_REF && order.total_amount == Cents::from_whole(250)
    }).returning(|_| Ok(placed_order(PaymentMethod::Cod, COD_PAYMENT_REF)));
    // No expectations on the provider. Any call panics the test.
    let provider = MockProvider::new();
    let orders_api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockBackend, MockProvider>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(provider));
}

fn configure_online_checkout(cfg: &mut ServiceConfig) {
    let mut backend = catalog_backend();
    backend.expect_insert_order().withf(|order| {
        order.payment_ref == PROVIDER_ORDER_ID && order.total_amount == Cents::from_whole(250)
    }).returning(|_| {
        let mut placed = placed_order(PaymentMethod::Online, PROVIDER_ORDER_ID);
        placed.order.payment_method = PaymentMethod::Online;
        Ok(placed)
    });
    let mut provider = MockProvider::new();
    provider
        .expect_create_order()
        .withf(|amount, _receipt| *amount == Cents::from_whole(250))
        .returning(|_, _| Ok(provider_order()));
    provider.expect_key_id().return_const("rzp_test_1234567890");
    let orders_api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockBackend, MockProvider>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(provider));
}

fn configure_provider_outage(cfg: &mut ServiceConfig) {
    let backend = catalog_backend();
    // insert_order carries no expectations. A checkout that stores an order after a provider failure
    // panics the test.
    let mut provider = MockProvider::new();
    provider.expect_create_order().returning(|_, _| {
        Err(razorpay_tools::RazorpayApiError::RestResponseError("connection refused".to_string()))
    });
    let orders_api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockBackend, MockProvider>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(provider));
}

fn configure_missing_item(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_restaurant().returning(|_| {
        Ok(Some(Restaurant { id: 5, name: "Pizza Palace".to_string(), owner_user_id: Some(UserId(40)) }))
    });
    backend.expect_fetch_menu_item().returning(|_| Ok(None));
    let provider = MockProvider::new();
    let orders_api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockBackend, MockProvider>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(provider));
}

fn configure_verification(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_confirm_payment().returning(|r| {
        let placed = placed_order(PaymentMethod::Online, r);
        let mut order = placed.order;
        order.payment_status = PaymentStatus::Paid;
        Ok(order)
    });
    let mut provider = MockProvider::new();
    provider
        .expect_verify_payment_signature()
        .returning(|_, _, signature| signature == "a-signature-the-mock-accepts");
    let orders_api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(VerifyPaymentRoute::<MockBackend, MockProvider>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(provider));
}

fn configure_unknown_reference(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend
        .expect_confirm_payment()
        .returning(|r| Err(OrderFlowError::PaymentRefNotFound(r.to_string())));
    let mut provider = MockProvider::new();
    provider.expect_verify_payment_signature().returning(|_, _, _| true);
    let orders_api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(VerifyPaymentRoute::<MockBackend, MockProvider>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(provider));
}
