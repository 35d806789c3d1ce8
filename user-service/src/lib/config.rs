use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token issuance and verification settings. The secret may be raw text
/// or base64 (`secret_base64`); it is decoded once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default)]
    pub secret_base64: bool,
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
    #[serde(default = "default_leeway_seconds")]
    pub leeway_seconds: i64,
}

/// External identity provider (Google OIDC) settings.
#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default = "default_google_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_google_jwks_uri")]
    pub jwks_uri: String,
    #[serde(default = "default_google_issuer")]
    pub issuer: String,
}

fn default_jwt_issuer() -> String {
    "NiN".to_string()
}

fn default_expiration_minutes() -> i64 {
    60
}

fn default_leeway_seconds() -> i64 {
    60
}

fn default_google_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_google_jwks_uri() -> String {
    "https://www.googleapis.com/oauth2/v3/certs".to_string()
}

fn default_google_issuer() -> String {
    "https://accounts.google.com".to_string()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
