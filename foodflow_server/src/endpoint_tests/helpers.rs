use actix_jwt_auth_middleware::AuthenticationService;
use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Utc};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
};
use log::debug;
use serde::Serialize;

use crate::{
    auth::{build_ffs_authority, JwtClaims, ACCESS_TOKEN_NAME},
    config::AuthConfig,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this key anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_signing_key: Hs256Key::new(b"test-only-signing-key-0123456789abcdef") }
}

pub fn issue_token(claims: JwtClaims, expiry: DateTime<Utc>) -> String {
    let config = get_auth_config();
    let header = Header::empty().with_token_type("JWT");
    let mut claims = Claims::new(claims);
    claims.expiration = Some(expiry);
    Hs256.token(&header, &claims, &config.jwt_signing_key).expect("Failed to sign token")
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::get().uri(path);
    send_request(req, auth_header, configure).await
}

pub async fn post_request<B: Serialize>(
    auth_header: &str,
    path: &str,
    body: &B,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).set_json(body);
    send_request(req, auth_header, configure).await
}

pub async fn put_request<B: Serialize>(
    auth_header: &str,
    path: &str,
    body: &B,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::put().uri(path).set_json(body);
    send_request(req, auth_header, configure).await
}

async fn send_request(
    mut req: TestRequest,
    auth_header: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !auth_header.is_empty() {
        req = req.insert_header((ACCESS_TOKEN_NAME, auth_header));
    }
    let req = req.to_request();
    let config = get_auth_config();
    let authority = build_ffs_authority(config.clone());
    let app = App::new().wrap(AuthenticationService::new(authority)).configure(configure);

    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
