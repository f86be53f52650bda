use ff_common::Cents;
use foodflow_engine::{
    db_types::{
        MenuItem,
        NewMenuItem,
        NewOrder,
        NewRestaurant,
        NewUser,
        Order,
        OrderId,
        OrderStatus,
        Restaurant,
        Role,
        Roles,
        UserAccount,
        UserId,
    },
    order_objects::OrderWithItems,
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        CatalogApiError,
        CatalogManagement,
        OrderFlowDatabase,
        OrderFlowError,
    },
};
use mockall::mock;
use razorpay_tools::{RazorpayApiError, RazorpayOrder};

use crate::integrations::razorpay::PaymentProvider;

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn register_user(&self, user: NewUser) -> Result<UserAccount, AuthApiError>;
        async fn verify_credentials(&self, email: &str, password: &str) -> Result<UserAccount, AuthApiError>;
        async fn fetch_roles_for_user(&self, user_id: UserId) -> Result<Roles, AuthApiError>;
        async fn check_user_has_roles(&self, user_id: UserId, roles: &[Role]) -> Result<(), AuthApiError>;
        async fn assign_roles(&self, email: &str, roles: &[Role]) -> Result<(), AuthApiError>;
        async fn remove_roles(&self, email: &str, roles: &[Role]) -> Result<u64, AuthApiError>;
    }
}

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_user_account(&self, user_id: UserId) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_user_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_order_with_items(&self, order_id: OrderId) -> Result<Option<OrderWithItems>, AccountApiError>;
        async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, AccountApiError>;
    }
}

// A full engine backend, for routes that go through `OrderFlowApi`.
mock! {
    pub Backend {}
    impl Clone for Backend {
        fn clone(&self) -> Self;
    }
    impl AccountManagement for Backend {
        async fn fetch_user_account(&self, user_id: UserId) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_user_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_order_with_items(&self, order_id: OrderId) -> Result<Option<OrderWithItems>, AccountApiError>;
        async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, AccountApiError>;
    }
    impl CatalogManagement for Backend {
        async fn fetch_restaurant(&self, restaurant_id: i64) -> Result<Option<Restaurant>, CatalogApiError>;
        async fn fetch_menu_item(&self, menu_item_id: i64) -> Result<Option<MenuItem>, CatalogApiError>;
        async fn fetch_menu_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<MenuItem>, CatalogApiError>;
        async fn upsert_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, CatalogApiError>;
        async fn upsert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, CatalogApiError>;
    }
    impl OrderFlowDatabase for Backend {
        fn url(&self) -> &'static str;
        async fn insert_order(&self, order: NewOrder) -> Result<OrderWithItems, OrderFlowError>;
        async fn confirm_payment(&self, payment_ref: &str) -> Result<Order, OrderFlowError>;
        async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, OrderFlowError>;
        async fn close(&mut self) -> Result<(), OrderFlowError>;
    }
}

mock! {
    pub Provider {}
    impl PaymentProvider for Provider {
        async fn create_order(&self, amount: Cents, receipt: String) -> Result<RazorpayOrder, RazorpayApiError>;
        fn key_id(&self) -> &'static str;
        fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
    }
}
