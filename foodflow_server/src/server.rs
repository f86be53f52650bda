use std::time::Duration;

use actix_jwt_auth_middleware::use_jwt::UseJWTOnApp;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use foodflow_engine::{
    events::{EventHandlers, EventProducers},
    AccountApi,
    AuthApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};
use log::info;

use crate::{
    auth::{build_ffs_authority, TokenIssuer},
    config::ServerConfig,
    errors::ServerError,
    integrations::razorpay::RazorpayProvider,
    routes::{
        health,
        CheckTokenRoute,
        CreateOrderRoute,
        LoginRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        OrderEventsRoute,
        RegisterRoute,
        RestaurantMenuRoute,
        UpdateRolesRoute,
        UpdateStatusRoute,
        VerifyPaymentRoute,
    },
    sse::{status_event_hooks, SessionRegistry},
};

/// How many undelivered engine events may queue up before producers start waiting.
const EVENT_BUFFER_SIZE: usize = 100;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let registry = SessionRegistry::new();
    let hooks = status_event_hooks(registry.clone());
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    info!("📬️ Order status event handlers started");
    let srv = create_server_instance(config, db, producers, registry)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    registry: SessionRegistry,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let provider = RazorpayProvider::new(config.razorpay.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let auth_api = AuthApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let authority = build_ffs_authority(config.auth.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ffs::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(provider.clone()))
            .app_data(web::Data::new(registry.clone()));
        // Routes that require authentication. `/orders/events` and `/orders/verify` must register before
        // `/orders/{id}` so the literal segments win.
        let auth_scope = web::scope("/api")
            .service(OrderEventsRoute::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, RazorpayProvider>::new())
            .service(CreateOrderRoute::<SqliteDatabase, RazorpayProvider>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(RestaurantMenuRoute::<SqliteDatabase>::new())
            .service(UpdateRolesRoute::<SqliteDatabase>::new())
            .service(CheckTokenRoute::new());
        // Registration and login are the only routes reachable without a token.
        let public_scope = web::scope("/auth")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new());
        app.use_jwt(authority.clone(), auth_scope).service(health).service(public_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
