//! # Configuration
//!
//! Typed configuration for the fulfillment core, loaded by [`ConfigManager`] from layered
//! YAML files plus `FULFILLMENT_*` environment overrides.
//!
//! ```yaml
//! shipping_api:
//!   base_url: https://api.example.com
//!   media_base_url: https://media.example.com
//!   timeout_ms: 30000
//!   auth:
//!     bearer_token: ${JWT}
//! ```

pub mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FulfillmentConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub shipping_api: ShippingApiConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL. `${DATABASE_URL}` expands from the environment.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Explicit database name, otherwise derived from the environment
    pub database: Option<String>,
    pub pool: u32,
    /// Seconds to wait for a pooled connection
    pub checkout_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            username: "fulfillment".to_string(),
            password: String::new(),
            database: None,
            pool: 10,
            checkout_timeout: 10,
        }
    }
}

impl DatabaseConfig {
    /// Get database name for the current environment
    pub fn database_name(&self, environment: &str) -> String {
        if let Some(db_name) = &self.database {
            return db_name.clone();
        }
        format!("fulfillment_{environment}")
    }

    /// Build complete database URL from configuration
    pub fn database_url(&self, environment: &str) -> String {
        if let Some(url) = &self.url {
            if url.starts_with("${DATABASE_URL}") {
                if let Ok(env_url) = std::env::var("DATABASE_URL") {
                    return env_url;
                }
            } else if !url.is_empty() {
                return url.clone();
            }
        }

        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username,
            self.password,
            self.host,
            self.port,
            self.database_name(environment)
        )
    }

    pub fn checkout_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout_timeout)
    }
}

/// Remote shipping API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShippingApiConfig {
    pub base_url: String,
    /// Host serving label files that are not user-scoped
    pub media_base_url: String,
    pub timeout_ms: u64,
    pub auth: ShippingApiAuth,
    pub endpoints: ShippingEndpoints,
}

impl Default for ShippingApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            media_base_url: "http://localhost:3001".to_string(),
            timeout_ms: 30_000,
            auth: ShippingApiAuth::default(),
            endpoints: ShippingEndpoints::default(),
        }
    }
}

impl ShippingApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Credentials sent with every request.
/// The CSRF token goes out as both a header and a cookie on state-changing calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShippingApiAuth {
    pub bearer_token: String,
    pub csrf_token: Option<String>,
    pub csrf_header: String,
    pub csrf_cookie: String,
}

impl Default for ShippingApiAuth {
    fn default() -> Self {
        Self {
            bearer_token: String::new(),
            csrf_token: None,
            csrf_header: "X-CSRF-Token".to_string(),
            csrf_cookie: "csrf-token".to_string(),
        }
    }
}

/// Endpoint paths relative to `base_url`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShippingEndpoints {
    pub orders: String,
    pub label_rates: String,
    pub purchase_label: String,
    pub process_batch: String,
    pub cancel_label: String,
    pub my_labels: String,
    pub standalone_labels: String,
    pub batch_labels: String,
    /// Prefix for user-scoped label files
    pub label_files: String,
}

impl Default for ShippingEndpoints {
    fn default() -> Self {
        Self {
            orders: "/vendor/orders/my".to_string(),
            label_rates: "/api/shipping/get-label-rates".to_string(),
            purchase_label: "/api/shipping/purchase-label".to_string(),
            process_batch: "/api/shipping/process-batch".to_string(),
            cancel_label: "/api/shipping/cancel-label".to_string(),
            my_labels: "/api/shipping/my-labels".to_string(),
            standalone_labels: "/api/subscriptions/shipping/standalone-labels".to_string(),
            batch_labels: "/api/shipping/batch-labels".to_string(),
            label_files: "/api/shipping/labels".to_string(),
        }
    }
}

impl ShippingEndpoints {
    fn all(&self) -> [(&'static str, &str); 9] {
        [
            ("orders", self.orders.as_str()),
            ("label_rates", self.label_rates.as_str()),
            ("purchase_label", self.purchase_label.as_str()),
            ("process_batch", self.process_batch.as_str()),
            ("cancel_label", self.cancel_label.as_str()),
            ("my_labels", self.my_labels.as_str()),
            ("standalone_labels", self.standalone_labels.as_str()),
            ("batch_labels", self.batch_labels.as_str()),
            ("label_files", self.label_files.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_output: bool,
    /// Overrides the environment's default level filter
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "log".to_string(),
            file_output: true,
            level: None,
        }
    }
}

impl FulfillmentConfig {
    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.database.url.is_none() && self.database.host.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "database.host",
                "database configuration",
            ));
        }

        if self.database.pool == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.pool",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if self.database.checkout_timeout == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.checkout_timeout",
                "0",
                "checkout timeout must be greater than 0",
            ));
        }

        for (field, value) in [
            ("shipping_api.base_url", &self.shipping_api.base_url),
            ("shipping_api.media_base_url", &self.shipping_api.media_base_url),
        ] {
            Url::parse(value).map_err(|e| {
                ConfigurationError::invalid_value(field, value.as_str(), e.to_string())
            })?;
        }

        if self.shipping_api.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "shipping_api.timeout_ms",
                "0",
                "timeout must be greater than 0",
            ));
        }

        for (name, path) in self.shipping_api.endpoints.all() {
            if !path.starts_with('/') {
                return Err(ConfigurationError::invalid_value(
                    format!("shipping_api.endpoints.{name}"),
                    path,
                    "endpoint paths must start with '/'",
                ));
            }
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                "0",
                "channel capacity must be greater than 0",
            ));
        }

        Ok(())
    }
}
