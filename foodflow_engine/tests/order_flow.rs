use ff_common::Cents;
use foodflow_engine::{
    db_types::{
        NewMenuItem,
        NewRestaurant,
        NewUser,
        OrderStatus,
        PaymentMethod,
        PaymentStatus,
        UserId,
        COD_PAYMENT_REF,
    },
    events::EventProducers,
    order_objects::{LineItemRequest, OrderWithItems},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    AccountManagement,
    AuthManagement,
    CatalogManagement,
    OrderFlowApi,
    OrderFlowDatabase,
    OrderFlowError,
    SqliteDatabase,
    MAX_LINE_QUANTITY,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use tokio::runtime::Runtime;

async fn setup() -> OrderFlowApi<SqliteDatabase> {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    OrderFlowApi::new(db, EventProducers::default())
}

async fn tear_down(mut api: OrderFlowApi<SqliteDatabase>) {
    if let Err(e) = api.db_mut().close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(api.db().url()).await.unwrap();
}

async fn register_alice(api: &OrderFlowApi<SqliteDatabase>) -> UserId {
    let account = api
        .db()
        .register_user(NewUser::new("Alice", "alice@example.com", "hunter2"))
        .await
        .expect("Error registering user");
    account.id
}

/// Seeds a restaurant with a naan at $5.00 and a curry at $12.50, returning (restaurant_id, naan_id, curry_id).
async fn seed_catalog(api: &OrderFlowApi<SqliteDatabase>) -> (i64, i64, i64) {
    let db = api.db();
    let restaurant = db
        .upsert_restaurant(NewRestaurant { name: "Spice Route".into(), owner_user_id: None })
        .await
        .expect("Error creating restaurant");
    let naan = db
        .upsert_menu_item(NewMenuItem::new(restaurant.id, "Garlic naan", Cents::from(500)))
        .await
        .expect("Error creating menu item");
    let curry = db
        .upsert_menu_item(NewMenuItem::new(restaurant.id, "Paneer curry", Cents::from(1250)))
        .await
        .expect("Error creating menu item");
    (restaurant.id, naan.id, curry.id)
}

async fn place_order(
    api: &OrderFlowApi<SqliteDatabase>,
    user_id: UserId,
    restaurant_id: i64,
    lines: &[LineItemRequest],
    method: PaymentMethod,
    payment_ref: &str,
) -> OrderWithItems {
    let priced = api.price_order(restaurant_id, lines).await.expect("Error pricing order");
    let order = priced.into_new_order(user_id, "12 Main Rd".into(), method, payment_ref.into());
    api.place_order(order).await.expect("Error placing order")
}

#[test]
fn pricing_comes_from_the_menu() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let user_id = register_alice(&api).await;
        let (restaurant_id, naan, curry) = seed_catalog(&api).await;
        let cart = [LineItemRequest::new(naan, 2), LineItemRequest::new(curry, 1)];
        let priced = api.price_order(restaurant_id, &cart).await.expect("Error pricing order");
        assert_eq!(priced.total, Cents::from(2250));
        assert_eq!(priced.items[0].name, "Garlic naan");
        assert_eq!(priced.items[0].unit_price, Cents::from(500));
        assert_eq!(priced.items[1].name, "Paneer curry");

        let placed = place_order(&api, user_id, restaurant_id, &cart, PaymentMethod::Cod, COD_PAYMENT_REF).await;
        assert_eq!(placed.order.total_amount, Cents::from(2250));
        assert_eq!(placed.order.status, OrderStatus::Placed);
        assert_eq!(placed.order.payment_status, PaymentStatus::Pending);
        assert_eq!(placed.order.payment_ref, COD_PAYMENT_REF);
        assert_eq!(placed.items.len(), 2);
        tear_down(api).await;
    });
}

#[test]
fn carts_that_cannot_be_priced_are_rejected() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let (restaurant_id, naan, _) = seed_catalog(&api).await;
        let other = api
            .db()
            .upsert_restaurant(NewRestaurant { name: "Burger Barn".into(), owner_user_id: None })
            .await
            .expect("Error creating restaurant");
        let foreign_item = api
            .db()
            .upsert_menu_item(NewMenuItem::new(other.id, "Smash burger", Cents::from(900)))
            .await
            .expect("Error creating menu item");
        let off_menu = api
            .db()
            .upsert_menu_item(NewMenuItem {
                restaurant_id,
                name: "Seasonal special".into(),
                price: Cents::from(1500),
                available: false,
            })
            .await
            .expect("Error creating menu item");

        let err = api.price_order(restaurant_id, &[]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::EmptyOrder));

        let err = api.price_order(restaurant_id, &[LineItemRequest::new(naan, 0)]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidQuantity));

        let err = api.price_order(restaurant_id, &[LineItemRequest::new(naan, MAX_LINE_QUANTITY + 1)]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidQuantity));

        // A quantity this size would wrap the i64 subtotal. It must be rejected before any arithmetic happens.
        let huge = 4_000_000_000_000_000_000;
        let err = api.price_order(restaurant_id, &[LineItemRequest::new(naan, huge)]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidQuantity));

        let err = api.price_order(999, &[LineItemRequest::new(naan, 1)]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::RestaurantNotFound(999)));

        let err = api.price_order(restaurant_id, &[LineItemRequest::new(99_999, 1)]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::MenuItemNotFound(99_999)));

        let err = api.price_order(restaurant_id, &[LineItemRequest::new(foreign_item.id, 1)]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::ItemFromOtherRestaurant { .. }));

        let err = api.price_order(restaurant_id, &[LineItemRequest::new(off_menu.id, 1)]).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::MenuItemUnavailable(_)));
        tear_down(api).await;
    });
}

#[test]
fn cod_orders_walk_the_full_fulfilment_chain() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let user_id = register_alice(&api).await;
        let (restaurant_id, naan, _) = seed_catalog(&api).await;
        let cart = [LineItemRequest::new(naan, 1)];
        let placed = place_order(&api, user_id, restaurant_id, &cart, PaymentMethod::Cod, COD_PAYMENT_REF).await;
        let id = placed.order.id;

        use OrderStatus::*;
        for status in [Accepted, Preparing, OutForDelivery, Delivered] {
            let updated = api.update_order_status(id, status).await.expect("Error advancing order");
            assert_eq!(updated.status, status);
        }
        // Delivered is terminal, even cancellation is off the table
        let err = api.update_order_status(id, Cancelled).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::StatusChangeForbidden));

        // The shared cash sentinel must never settle anything
        let err = api.confirm_payment(COD_PAYMENT_REF).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::PaymentRefNotFound(_)));
        tear_down(api).await;
    });
}

#[test]
fn skipping_fulfilment_steps_is_forbidden() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let user_id = register_alice(&api).await;
        let (restaurant_id, naan, _) = seed_catalog(&api).await;
        let cart = [LineItemRequest::new(naan, 1)];
        let placed = place_order(&api, user_id, restaurant_id, &cart, PaymentMethod::Cod, COD_PAYMENT_REF).await;
        let id = placed.order.id;

        use OrderStatus::*;
        for illegal in [Preparing, OutForDelivery, Delivered] {
            let err = api.update_order_status(id, illegal).await.unwrap_err();
            assert!(matches!(err, OrderFlowError::StatusChangeForbidden), "Placed -> {illegal} must be rejected");
        }
        let err = api.update_order_status(id, Placed).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::StatusChangeNoOp));

        // Backwards moves are rejected too
        api.update_order_status(id, Accepted).await.expect("Error advancing order");
        let err = api.update_order_status(id, Placed).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::StatusChangeForbidden));
        tear_down(api).await;
    });
}

#[test]
fn any_active_order_can_be_cancelled() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let user_id = register_alice(&api).await;
        let (restaurant_id, naan, _) = seed_catalog(&api).await;
        let cart = [LineItemRequest::new(naan, 1)];

        use OrderStatus::*;
        // Cancel from Placed
        let placed = place_order(&api, user_id, restaurant_id, &cart, PaymentMethod::Cod, COD_PAYMENT_REF).await;
        let cancelled = api.update_order_status(placed.order.id, Cancelled).await.expect("Error cancelling order");
        assert_eq!(cancelled.status, Cancelled);
        // Cancelled is terminal
        let err = api.update_order_status(placed.order.id, Accepted).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::StatusChangeForbidden));

        // Cancel from OutForDelivery
        let placed = place_order(&api, user_id, restaurant_id, &cart, PaymentMethod::Cod, COD_PAYMENT_REF).await;
        let id = placed.order.id;
        for status in [Accepted, Preparing, OutForDelivery] {
            api.update_order_status(id, status).await.expect("Error advancing order");
        }
        let cancelled = api.update_order_status(id, Cancelled).await.expect("Error cancelling order");
        assert_eq!(cancelled.status, Cancelled);
        tear_down(api).await;
    });
}

#[test]
fn online_payment_confirmation_is_idempotent() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let user_id = register_alice(&api).await;
        let (restaurant_id, naan, _) = seed_catalog(&api).await;
        let cart = [LineItemRequest::new(naan, 2)];
        let placed =
            place_order(&api, user_id, restaurant_id, &cart, PaymentMethod::Online, "order_TESTPAY123").await;
        assert_eq!(placed.order.payment_status, PaymentStatus::Pending);

        let first = api.confirm_payment("order_TESTPAY123").await.expect("Error confirming payment");
        assert_eq!(first.id, placed.order.id);
        assert_eq!(first.payment_status, PaymentStatus::Paid);

        // A second confirmation for the same reference also succeeds
        let second = api.confirm_payment("order_TESTPAY123").await.expect("Error repeating confirmation");
        assert_eq!(second.payment_status, PaymentStatus::Paid);

        let err = api.confirm_payment("order_NOSUCHREF").await.unwrap_err();
        assert!(matches!(err, OrderFlowError::PaymentRefNotFound(_)));
        tear_down(api).await;
    });
}

#[test]
fn order_history_is_newest_first_with_items() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let user_id = register_alice(&api).await;
        let (restaurant_id, naan, curry) = seed_catalog(&api).await;

        let first =
            place_order(&api, user_id, restaurant_id, &[LineItemRequest::new(naan, 1)], PaymentMethod::Cod, COD_PAYMENT_REF)
                .await;
        let second =
            place_order(&api, user_id, restaurant_id, &[LineItemRequest::new(curry, 1)], PaymentMethod::Cod, COD_PAYMENT_REF)
                .await;
        let third =
            place_order(&api, user_id, restaurant_id, &[LineItemRequest::new(naan, 3)], PaymentMethod::Cod, COD_PAYMENT_REF)
                .await;

        let history = api.db().fetch_orders_for_user(user_id).await.expect("Error fetching history");
        assert_eq!(history.len(), 3);
        let ids: Vec<_> = history.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![third.order.id, second.order.id, first.order.id]);
        assert!(history.iter().all(|o| !o.items.is_empty()));
        tear_down(api).await;
    });
}
