use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::Utc;
use foodflow_engine::{
    db_types::{Role, UserAccount, UserId},
    traits::AuthApiError,
    AuthApi,
};
use jwt_compact::{alg::Hs256, AlgorithmExt, Claims, UntrustedToken};
use log::*;
use serde_json::json;

use super::{helpers::get_auth_config, mocks::MockAuthManager};
use crate::{
    auth::{JwtClaims, TokenIssuer},
    routes::{LoginRoute, RegisterRoute},
};

fn alice() -> UserAccount {
    UserAccount {
        id: UserId(1),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: "$argon2id$fake".to_string(),
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn login_with_valid_credentials_issues_a_token() {
    let _ = env_logger::try_init().ok();
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_verify_credentials().returning(|_, _| Ok(alice()));
    auth_manager.expect_fetch_roles_for_user().returning(|_| Ok(vec![Role::User]));
    let body = json!({"email": "alice@example.com", "password": "hunter2"});
    let (status, body) = send(auth_manager, "/login", &body).await;
    assert!(status.is_success(), "was: {status} {body}");
    let token = serde_json::from_str::<serde_json::Value>(&body).unwrap()["token"].as_str().unwrap().to_string();
    let claims = validate_token(&token).unwrap();
    assert_eq!(claims.user_id, UserId(1));
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.roles, vec![Role::User]);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_verify_credentials().returning(|_, _| Err(AuthApiError::InvalidCredentials));
    let body = json!({"email": "alice@example.com", "password": "wrong"});
    let (status, body) = send(auth_manager, "/login", &body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. Invalid email address or password."}"#);
}

#[actix_web::test]
async fn register_returns_the_new_account_without_the_password_hash() {
    let _ = env_logger::try_init().ok();
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_register_user().returning(|_| Ok(alice()));
    let body = json!({"name": "Alice", "email": "alice@example.com", "password": "hunter2"});
    let (status, body) = send(auth_manager, "/register", &body).await;
    assert!(status.is_success(), "was: {status} {body}");
    let account = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(account["email"], "alice@example.com");
    assert!(account.get("password_hash").is_none(), "password hash must never be serialized");
}

#[actix_web::test]
async fn register_with_duplicate_email_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_register_user().returning(|_| Err(AuthApiError::EmailAlreadyInUse));
    let body = json!({"name": "Alice", "email": "alice@example.com", "password": "hunter2"});
    let (status, body) = send(auth_manager, "/register", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("An account with this email address already exists"), "was: {body}");
}

fn configure_app(auth_manager: MockAuthManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let auth_api = AuthApi::new(auth_manager);
        let jwt_signer = TokenIssuer::new(&get_auth_config());
        cfg.app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(jwt_signer))
            .service(RegisterRoute::<MockAuthManager>::new())
            .service(LoginRoute::<MockAuthManager>::new());
    }
}

async fn send(auth_manager: MockAuthManager, path: &str, body: &serde_json::Value) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).set_json(body).to_request();
    let app = App::new().configure(configure_app(auth_manager));
    let app = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

fn validate_token(token: &str) -> Result<JwtClaims, String> {
    debug!("Validating token: {token}");
    let key = get_auth_config().jwt_signing_key;
    let untrusted_token = UntrustedToken::new(token).map_err(|e| format!("Invalid token format: {e:?}"))?;
    let _claims: Claims<JwtClaims> =
        untrusted_token.deserialize_claims_unchecked().map_err(|e| format!("Claims validation error: {e:?}"))?;
    let (header, claims) =
        Hs256.validator(&key).validate(&untrusted_token).map_err(|e| format!("Signature error: {e}"))?.into_parts();
    debug!("Access token validated successfully. Header: {header:?}. Claims: {claims:?}");
    let expiry = claims.expiration.unwrap().signed_duration_since(Utc::now());
    assert!(expiry.num_hours() < 24 && expiry.num_hours() >= 23, "Expiry: {}", expiry.num_hours());
    assert_eq!(header.token_type.unwrap(), "JWT");
    Ok(claims.custom)
}
