//! Configuration Loader
//!
//! Environment-aware loading: `base.yaml`, then `<environment>.yaml`, then
//! `FULFILLMENT_<SECTION>__<KEY>` environment variables, each layer overriding the last.

use super::error::{ConfigResult, ConfigurationError};
use super::FulfillmentConfig;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const ENV_PREFIX: &str = "FULFILLMENT";
const BASE_FILE: &str = "base.yaml";

/// Loaded configuration together with the environment it was resolved for
#[derive(Debug)]
pub struct ConfigManager {
    config: FulfillmentConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let base_path = config_directory.join(BASE_FILE);
        if !base_path.is_file() {
            return Err(ConfigurationError::FileNotFound(
                base_path.display().to_string(),
            ));
        }

        let config: FulfillmentConfig = Config::builder()
            .add_source(File::from(base_path).required(true))
            .add_source(
                File::from(config_directory.join(format!("{environment}.yaml"))).required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        let manager = ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        };

        debug!(config = %manager.debug_config(), "Resolved configuration");
        info!(
            environment = environment,
            base_url = %manager.config.shipping_api.base_url,
            pool_size = manager.config.database.pool,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(manager))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &FulfillmentConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    pub fn database_url(&self) -> String {
        self.config.database.database_url(&self.environment)
    }

    pub fn is_test_environment(&self) -> bool {
        self.environment == "test"
    }

    pub fn is_production_environment(&self) -> bool {
        self.environment == "production"
    }

    /// Configuration as JSON with credentials masked, safe to log
    pub fn debug_config(&self) -> serde_json::Value {
        let mut value = serde_json::json!(self.config);
        let sensitive_patterns = ["password", "secret", "key", "token", "credential", "auth"];
        Self::sanitize_json_recursive(&mut value, &sensitive_patterns);
        value
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        Self::mask_value(val);
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }

    fn mask_value(val: &mut serde_json::Value) {
        let masked = match &*val {
            serde_json::Value::String(s) if s.is_empty() => {
                serde_json::Value::String("[EMPTY]".to_string())
            }
            serde_json::Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let masked = if chars.len() > 4 {
                    format!(
                        "{}***{}",
                        chars[..2].iter().collect::<String>(),
                        chars[chars.len() - 2..].iter().collect::<String>()
                    )
                } else {
                    "***".to_string()
                };
                serde_json::Value::String(format!("[MASKED: {masked}]"))
            }
            serde_json::Value::Null => serde_json::Value::Null,
            _ => serde_json::Value::String("[MASKED]".to_string()),
        };
        *val = masked;
    }

    /// Detect current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("FULFILLMENT_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        let candidates = [
            PathBuf::from("config/fulfillment"),
            PathBuf::from("../config/fulfillment"),
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/fulfillment"),
        ];

        candidates
            .iter()
            .find(|dir| dir.join(BASE_FILE).exists())
            .cloned()
            .unwrap_or_else(|| PathBuf::from("config/fulfillment"))
    }
}
