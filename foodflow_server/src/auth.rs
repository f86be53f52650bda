use std::time::Duration;

use actix_jwt_auth_middleware::{Authority, FromRequest, TokenSigner};
use actix_web::{error::Error as ActixWebError, Handler};
use foodflow_engine::db_types::{Role, Roles, UserId};
use jwt_compact::{alg::Hs256, Header};
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError};

/// The header (or cookie) name that carries the access token on every authenticated request.
pub const ACCESS_TOKEN_NAME: &str = "ff_access_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRequest)]
pub struct JwtClaims {
    pub user_id: UserId,
    pub email: String,
    pub roles: Roles,
}

impl JwtClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

pub type FfsAuthority = Authority<JwtClaims, Hs256, impl Handler<(), Output = Result<(), ActixWebError>>, ()>;

fn build_jwt_signer(auth_config: &AuthConfig) -> TokenSigner<JwtClaims, Hs256> {
    let header = Header::empty().with_token_type("JWT");
    TokenSigner::new()
        .signing_key(auth_config.jwt_signing_key.clone())
        .algorithm(Hs256)
        .access_token_name(ACCESS_TOKEN_NAME)
        .header(header)
        .build()
        .expect("Failed to build token signer")
}

#[define_opaque(FfsAuthority)]
pub fn build_ffs_authority(auth_config: AuthConfig) -> FfsAuthority {
    let token_signer = build_jwt_signer(&auth_config);
    Authority::<JwtClaims, Hs256, _, _>::new()
        .refresh_authorizer(|| async { Ok(()) })
        .enable_header_tokens(true)
        .access_token_name(ACCESS_TOKEN_NAME)
        .algorithm(Hs256)
        .verifying_key(auth_config.jwt_signing_key)
        .token_signer(Some(token_signer))
        .build()
        .expect("Failed to build authority")
}

pub struct TokenIssuer {
    signer: TokenSigner<JwtClaims, Hs256>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let signer = build_jwt_signer(config);
        Self { signer }
    }

    /// Issue a new access token for the given claims.
    /// Credential verification MUST happen before calling `issue_token`.
    pub fn issue_token(&self, claims: JwtClaims, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::from_secs(60 * 60 * 24));
        let token = self
            .signer
            .create_signed_token(&claims, duration)
            .map_err(|e| AuthError::TokenIssueError(format!("{e:?}")))?;
        Ok(token)
    }
}
