use std::{env, fmt::Debug, io::Write};

use jwt_compact::alg::Hs256Key;
use log::*;
use rand::RngCore;
use razorpay_tools::RazorpayConfig;
use serde_json::json;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_FFS_HOST: &str = "127.0.0.1";
const DEFAULT_FFS_PORT: u16 = 4460;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Payment provider credentials for online checkouts.
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FFS_HOST.to_string(),
            port: DEFAULT_FFS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FF_HOST").ok().unwrap_or_else(|| DEFAULT_FFS_HOST.into());
        let port = env::var("FF_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for FF_PORT. {e} Using the default, {DEFAULT_FFS_PORT}, instead.");
                    DEFAULT_FFS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FFS_PORT);
        let database_url = env::var("FF_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ FF_DATABASE_URL is not set. Please set it to the URL for the FoodFlow database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let razorpay = RazorpayConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, razorpay }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone)]
pub struct AuthConfig {
    /// The symmetric key used to sign and verify JWTs. Must be at least 32 bytes.
    pub jwt_signing_key: Hs256Key,
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthConfig {{ jwt_signing_key: [redacted] }}")
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT signing key has not been set. I'm using a random value for this session. DO NOT operate \
             on production like this since all sessions will be invalidated on restart. 🚨️🚨️🚨️"
        );
        let mut key_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key_bytes);
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_signing_key": hex::encode(key_bytes) }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT signing key for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the FF_JWT_SIGNING_KEY environment variable instead. \
                         🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT signing key to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT signing key. ");
            },
        }
        Self { jwt_signing_key: Hs256Key::new(key_bytes) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let key_hex = env::var("FF_JWT_SIGNING_KEY")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [FF_JWT_SIGNING_KEY]")))?;
        let key_bytes = hex::decode(&key_hex).map_err(|e| {
            ServerError::ConfigurationError(format!("Invalid hex in FF_JWT_SIGNING_KEY: {e}"))
        })?;
        if key_bytes.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "FF_JWT_SIGNING_KEY must be at least 32 bytes (64 hex characters).".to_string(),
            ));
        }
        Ok(Self { jwt_signing_key: Hs256Key::new(key_bytes) })
    }
}
