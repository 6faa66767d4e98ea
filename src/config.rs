use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub app_name: String,
    pub host: String,
    /// 0 lets the OS pick a free port
    pub port: u16,
    pub start_timeout_secs: u64,
    pub stop_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allow_credentials: bool,
    /// `["*"]` allows any header
    pub allowed_headers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout_secs: u64,
    pub prefix: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: split_list("GET,POST,PUT,PATCH,DELETE"),
            allow_credentials: false,
            allowed_headers: vec!["*".to_string()],
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                app_name: env::var("APP_NAME").unwrap_or_else(|_| "http-scaffold".to_string()),
                host: env::var("API_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "0".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                start_timeout_secs: env::var("SERVER_START_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("SERVER_START_TIMEOUT_SECS must be a valid number")?,
                stop_timeout_secs: env::var("SERVER_STOP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("SERVER_STOP_TIMEOUT_SECS must be a valid number")?,
            },
            cors: Self::cors_config_from_env()?,
            client: ClientConfig {
                timeout_secs: env::var("CLIENT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("CLIENT_TIMEOUT_SECS must be a valid number")?,
                prefix: env::var("CLIENT_PREFIX").unwrap_or_default(),
            },
        })
    }

    fn cors_config_from_env() -> Result<CorsConfig> {
        let defaults = CorsConfig::default();

        Ok(CorsConfig {
            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.allowed_origins),
            allowed_methods: env::var("CORS_ALLOWED_METHODS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.allowed_methods),
            allow_credentials: env::var("CORS_ALLOW_CREDENTIALS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("CORS_ALLOW_CREDENTIALS must be true or false")?,
            allowed_headers: env::var("CORS_ALLOWED_HEADERS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.allowed_headers),
        })
    }
}

impl ServerConfig {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
