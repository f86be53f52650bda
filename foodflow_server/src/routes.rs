//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use ff_common::Cents;
use foodflow_engine::{
    db_types::{NewUser, OrderId, PaymentMethod, Role, COD_PAYMENT_REF},
    traits::{AccountManagement, AuthManagement, CatalogManagement, OrderFlowDatabase},
    AccountApi,
    AuthApi,
    CatalogApi,
    OrderFlowApi,
};
use log::*;
use razorpay_tools::helpers::new_receipt_id;

use crate::{
    auth::{JwtClaims, TokenIssuer},
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
    errors::ServerError,
    integrations::razorpay::PaymentProvider,
    sse::SessionRegistry,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:ty),*]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:ty),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/register" impl AuthManagement);
/// Route handler for the registration endpoint.
///
/// Creates a new customer account. Every new account gets the `User` role and nothing else; operator roles are
/// assigned by an admin via the `/roles` endpoint. The email must not belong to an existing account.
pub async fn register<A: AuthManagement>(
    api: web::Data<AuthApi<A>>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    trace!("💻️ Received registration request for {}", req.email);
    let new_user = NewUser::new(req.name, req.email, req.password);
    let account = api.register_user(new_user).await?;
    debug!("💻️ Registered new account {} for {}", account.id, account.email);
    Ok(HttpResponse::Ok().json(account))
}

route!(login => Post "/login" impl AuthManagement);
/// Route handler for the login endpoint.
///
/// Verifies the supplied credentials and, if they check out, issues a JWT access token carrying the account's
/// id, email and roles. The token is valid for 24 hours and does NOT refresh. All `/api` routes require it, in
/// the `ff_access_token` header.
pub async fn login<A: AuthManagement>(
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    trace!("💻️ Received login request for {}", req.email);
    let account = api.verify_credentials(&req.email, &req.password).await?;
    let roles = api.fetch_roles_for_user(account.id).await?;
    let claims = JwtClaims { user_id: account.id, email: account.email, roles };
    let token = signer.issue_token(claims, None)?;
    debug!("💻️ Issued access token for user {}", account.id);
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

route!(check_token => Get "/check_token" requires [Role::User]);
/// A convenience route that lets clients check whether their access token is still valid.
pub async fn check_token(claims: JwtClaims) -> HttpResponse {
    debug!("💻️ GET check_token for {}", claims.user_id);
    HttpResponse::Ok().json(JsonResponse::success("Token is valid."))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl AccountManagement);
/// Returns the caller's order history, newest first, with line items included.
pub async fn my_orders<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", claims.user_id);
    let orders = api.order_history(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl AccountManagement);
/// Returns a single order with its items. Only the order's owner and admins may fetch it.
pub async fn order_by_id<B: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    debug!("💻️ GET order {order_id} for {}", claims.user_id);
    let order = api
        .fetch_order_with_items(order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    if order.order.user_id != claims.user_id && !claims.is_admin() {
        return Err(ServerError::InsufficientPermissions(format!(
            "User {} may not view order {order_id}",
            claims.user_id
        )));
    }
    Ok(HttpResponse::Ok().json(order))
}

route!(create_order => Post "/orders" impl OrderFlowDatabase, PaymentProvider);
/// The checkout endpoint.
///
/// The order is priced server-side against the live catalog. The client's `totalAmount` is treated as a display
/// hint only; a mismatch is logged and the recomputed total is charged.
///
/// Cash-on-delivery orders are stored immediately with the sentinel payment reference. Online orders are first
/// registered with the payment provider; only once the provider order exists is the local order stored, keyed to
/// the provider order id. If the provider call fails, no local state changes and the client gets a 502.
pub async fn create_order<B: OrderFlowDatabase, P: PaymentProvider>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
    provider: web::Data<P>,
    body: web::Json<NewOrderRequest>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    debug!("💻️ POST create_order for {} at restaurant #{}", claims.user_id, req.restaurant);
    let priced = api.price_order(req.restaurant, &req.items).await?;
    let client_total = Cents::from_decimal(req.total_amount);
    if client_total != priced.total {
        warn!(
            "💻️ Client-side total ({client_total}) disagrees with the recomputed total ({}) for user {}. Charging \
             the recomputed total.",
            priced.total, claims.user_id
        );
    }
    let response = match req.payment_method {
        PaymentMethod::Cod => {
            let new_order = priced.into_new_order(
                claims.user_id,
                req.delivery_address,
                req.payment_method,
                COD_PAYMENT_REF.to_string(),
            );
            let order = api.place_order(new_order).await?;
            CheckoutResponse::Cod { order }
        },
        PaymentMethod::Online => {
            let receipt = new_receipt_id();
            let provider_order = provider.create_order(priced.total, receipt).await.map_err(|e| {
                warn!("💳️ Could not create a provider order. {e}");
                ServerError::PaymentInitiationError(e.to_string())
            })?;
            let new_order = priced.into_new_order(
                claims.user_id,
                req.delivery_address,
                req.payment_method,
                provider_order.id.clone(),
            );
            let order = api.place_order(new_order).await?;
            CheckoutResponse::Online { order, provider_order, key_id: provider.key_id().to_string() }
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

route!(verify_payment => Post "/orders/verify" impl OrderFlowDatabase, PaymentProvider);
/// Verifies a payment callback from the checkout page.
///
/// The posted signature is recomputed from the provider order id and payment id with the key secret. Only when it
/// matches is the order looked up and marked as paid. A bad signature never touches the database.
pub async fn verify_payment<B: OrderFlowDatabase, P: PaymentProvider>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
    provider: web::Data<P>,
    body: web::Json<PaymentVerificationRequest>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    debug!("💻️ POST verify_payment for provider order {} from {}", req.provider_order_id, claims.user_id);
    if !provider.verify_payment_signature(&req.provider_order_id, &req.provider_payment_id, &req.signature) {
        warn!("💳️ Invalid payment signature posted for provider order {}", req.provider_order_id);
        return Ok(HttpResponse::BadRequest().json(JsonResponse::failure("Invalid payment signature")));
    }
    match api.confirm_payment(&req.provider_order_id).await {
        Ok(order) => {
            info!("💳️ Payment confirmed for order {}", order.id);
            Ok(HttpResponse::Ok().json(JsonResponse::success("Payment verified")))
        },
        Err(foodflow_engine::OrderFlowError::PaymentRefNotFound(r)) => {
            warn!("💳️ Payment verification posted for unknown provider order {r}");
            Ok(HttpResponse::NotFound().json(JsonResponse::failure("No order matches this payment")))
        },
        Err(e) => Err(e.into()),
    }
}

route!(update_status => Put "/orders/{id}/status" impl OrderFlowDatabase);
/// Advances an order through the fulfilment flow.
///
/// Admins may move any order. Restaurant owners may only move orders belonging to a restaurant they own. The
/// engine enforces the transition table, so an allowed caller can still get a 400 for an illegal jump.
pub async fn update_status<B: OrderFlowDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    let new_status = body.into_inner().status;
    debug!("💻️ PUT update_status for order {order_id} to {new_status} by {}", claims.user_id);
    check_status_update_permission(&claims, order_id, api.db()).await?;
    let order = api.update_order_status(order_id, new_status).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Admins may advance any order. Restaurant owners may only advance orders of restaurants they own. Everyone else
/// is refused.
async fn check_status_update_permission<B: OrderFlowDatabase>(
    claims: &JwtClaims,
    order_id: OrderId,
    db: &B,
) -> Result<(), ServerError> {
    if claims.is_admin() {
        return Ok(());
    }
    if !claims.has_role(Role::RestaurantOwner) {
        return Err(ServerError::InsufficientPermissions(format!(
            "User {} may not change order statuses",
            claims.user_id
        )));
    }
    let order = db
        .fetch_order_by_id(order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    let restaurant = db
        .fetch_restaurant(order.restaurant_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Restaurant #{} does not exist", order.restaurant_id)))?;
    if restaurant.owner_user_id != Some(claims.user_id) {
        return Err(ServerError::InsufficientPermissions(format!(
            "User {} does not operate restaurant #{}",
            claims.user_id, restaurant.id
        )));
    }
    Ok(())
}

//----------------------------------------------   SSE  ----------------------------------------------------
route!(order_events => Get "/orders/events" requires [Role::User]);
/// Opens a server-sent-event stream of the caller's order status updates.
///
/// Each frame is an `orderStatusUpdated` event with `{orderId, status}` data. Frames are best-effort; clients
/// must reconcile with `GET /orders` after a reconnect.
pub async fn order_events(claims: JwtClaims, registry: web::Data<SessionRegistry>) -> HttpResponse {
    debug!("💻️ GET order_events for {}", claims.user_id);
    let stream = registry.subscribe(claims.user_id);
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(restaurant_menu => Get "/restaurants/{id}/menu" impl CatalogManagement);
/// Returns the menu for a restaurant. Unavailable items are included so clients can render them greyed out.
pub async fn restaurant_menu<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let restaurant_id = path.into_inner();
    trace!("💻️ GET menu for restaurant #{restaurant_id}");
    let _ = api
        .fetch_restaurant(restaurant_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Restaurant #{restaurant_id} does not exist")))?;
    let menu = api.menu_for_restaurant(restaurant_id).await?;
    Ok(HttpResponse::Ok().json(menu))
}

//----------------------------------------------   Roles  ----------------------------------------------------
route!(update_roles => Post "/roles" impl AuthManagement where requires [Role::Admin]);
/// Applies and/or revokes roles for a set of accounts. Admin only.
pub async fn update_roles<A: AuthManagement>(
    api: web::Data<AuthApi<A>>,
    body: web::Json<Vec<RoleUpdateRequest>>,
) -> Result<HttpResponse, ServerError> {
    let requests = body.into_inner();
    debug!("💻️ POST update_roles for {} account(s)", requests.len());
    for req in requests {
        if !req.apply.is_empty() {
            api.assign_roles(&req.email, &req.apply).await?;
        }
        if !req.revoke.is_empty() {
            api.remove_roles(&req.email, &req.revoke).await?;
        }
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("Roles updated")))
}
