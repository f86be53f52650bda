use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Days, TimeZone, Utc};
use ff_common::Cents;
use foodflow_engine::{
    db_types::{Order, OrderId, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Restaurant, Role, Roles, UserId},
    events::EventProducers,
    order_objects::OrderWithItems,
    AccountApi,
    OrderFlowApi,
};
use log::debug;
use serde_json::json;

use super::{
    helpers::{get_request, issue_token, put_request},
    mocks::{MockAccountManager, MockBackend},
};
use crate::{
    auth::JwtClaims,
    routes::{MyOrdersRoute, OrderByIdRoute, UpdateStatusRoute},
};

#[actix_web::test]
async fn fetch_my_orders_no_headers() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/orders", configure_accounts).await.expect_err("Expected error");
    assert_eq!(
        err,
        "An error occurred, no cookie containing a jwt was found in the request. Please first authenticate with this \
         application."
    );
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(1, vec![Role::User]);
    let (status, body) = get_request(&token, "/orders", configure_accounts).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn fetch_my_orders_invalid_sig() {
    let _ = env_logger::try_init().ok();
    let mut token = valid_token(1, vec![Role::User]);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    debug!("Calling /orders with invalid token {token}");
    let err = get_request(&token, "/orders", configure_accounts).await.expect_err("Expected error");
    assert_eq!(err, "An error occurred validating the jwt.\n\t Error: \"signature has failed verification\"");
}

#[actix_web::test]
async fn owner_can_fetch_their_order_by_id() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(1, vec![Role::User]);
    let (status, body) = get_request(&token, "/orders/1", configure_accounts).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn another_user_may_not_fetch_the_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(2, vec![Role::User]);
    let (status, body) = get_request(&token, "/orders/1", configure_accounts).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Insufficient Permissions"), "was: {body}");
}

#[actix_web::test]
async fn an_admin_may_fetch_any_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(99, vec![Role::User, Role::Admin]);
    let (status, body) = get_request(&token, "/orders/1", configure_accounts).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn a_plain_user_may_not_advance_an_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(1, vec![Role::User]);
    let body = json!({"status": "Accepted"});
    let (status, body) = put_request(&token, "/orders/1/status", &body, configure_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Insufficient Permissions"), "was: {body}");
}

#[actix_web::test]
async fn the_restaurant_owner_may_advance_their_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(40, vec![Role::User, Role::RestaurantOwner]);
    let body = json!({"status": "Accepted"});
    let (status, body) = put_request(&token, "/orders/1/status", &body, configure_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK, "was: {body}");
    assert!(body.contains(r#""status":"Accepted""#), "was: {body}");
}

#[actix_web::test]
async fn an_owner_of_a_different_restaurant_is_refused() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(41, vec![Role::User, Role::RestaurantOwner]);
    let body = json!({"status": "Accepted"});
    let (status, body) = put_request(&token, "/orders/1/status", &body, configure_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("does not operate restaurant"), "was: {body}");
}

#[actix_web::test]
async fn skipping_a_fulfilment_step_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(99, vec![Role::User, Role::Admin]);
    let body = json!({"status": "Delivered"});
    let (status, body) = put_request(&token, "/orders/1/status", &body, configure_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: The requested status change is forbidden."}"#);
}

#[actix_web::test]
async fn repeating_the_current_status_is_a_no_op_error() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(99, vec![Role::User, Role::Admin]);
    let body = json!({"status": "Placed"});
    let (status, body) = put_request(&token, "/orders/1/status", &body, configure_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("no-op"), "was: {body}");
}

fn valid_token(user_id: i64, roles: Roles) -> String {
    issue_token(
        JwtClaims { user_id: UserId(user_id), email: format!("user{user_id}@example.com"), roles },
        Utc::now() + Days::new(1),
    )
}

fn configure_accounts(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_orders_for_user().returning(move |_| Ok(orders_response()));
    account_manager.expect_fetch_order_with_items().returning(move |_| Ok(Some(order_response())));
    let accounts_api = AccountApi::new(account_manager);
    cfg.service(MyOrdersRoute::<MockAccountManager>::new())
        .service(OrderByIdRoute::<MockAccountManager>::new())
        .app_data(web::Data::new(accounts_api));
}

fn configure_backend(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(move |_| Ok(Some(order_response().order)));
    backend.expect_fetch_restaurant().returning(move |_| {
        Ok(Some(Restaurant { id: 5, name: "Pizza Palace".to_string(), owner_user_id: Some(UserId(40)) }))
    });
    backend.expect_set_order_status().returning(move |_, status| {
        let mut order = order_response().order;
        order.status = status;
        Ok(order)
    });
    let orders_api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(UpdateStatusRoute::<MockBackend>::new()).app_data(web::Data::new(orders_api));
}

// Mock response to the order-history and order-by-id calls
fn order_response() -> OrderWithItems {
    let order = Order {
        id: OrderId(1),
        user_id: UserId(1),
        restaurant_id: 5,
        total_amount: Cents::from_whole(250),
        delivery_address: "12 Main Rd".to_string(),
        status: OrderStatus::Placed,
        payment_status: PaymentStatus::Pending,
        payment_method: PaymentMethod::Cod,
        payment_ref: "cod_order".to_string(),
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

fn orders_response() -> Vec<OrderWithItems> {
    vec![order_response()]
}

const ORDER_JSON: &str = r#"{"id":1,"userId":1,"restaurantId":5,"totalAmount":25000,"deliveryAddress":"12 Main Rd","status":"Placed","paymentStatus":"Pending","paymentMethod":"cod","paymentRef":"cod_order","createdAt":"2024-02-29T13:30:00Z","updatedAt":"2024-02-29T13:30:00Z","items":[{"id":1,"orderId":1,"menuItem":11,"name":"Margherita","price":12500,"quantity":2}]}"#;

const ORDERS_JSON: &str = r#"[{"id":1,"userId":1,"restaurantId":5,"totalAmount":25000,"deliveryAddress":"12 Main Rd","status":"Placed","paymentStatus":"Pending","paymentMethod":"cod","paymentRef":"cod_order","createdAt":"2024-02-29T13:30:00Z","updatedAt":"2024-02-29T13:30:00Z","items":[{"id":1,"orderId":1,"menuItem":11,"name":"Margherita","price":12500,"quantity":2}]}]"#;
