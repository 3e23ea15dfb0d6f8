//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and, optionally, a JSON log file
//! per process under the configured log directory.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigManager, LoggingConfig};
use crate::models::{ItemId, LabelRef};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with default settings for the detected environment
pub fn init_structured_logging() {
    init_structured_logging_with(&LoggingConfig::default());
}

/// Initialize structured logging once per process. Later calls are no-ops.
pub fn init_structured_logging_with(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let log_level = config
            .level
            .clone()
            .unwrap_or_else(|| default_log_level(&environment).to_string());

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(env_filter(&log_level));

        let log_dir = PathBuf::from(&config.directory);
        let file_layer = if config.file_output && fs::create_dir_all(&log_dir).is_ok() {
            let pid = process::id();
            let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
            let file_name = format!("{environment}.{pid}.{timestamp}.log");
            let file_appender = tracing_appender::rolling::never(&log_dir, &file_name);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            // The guard flushes on drop; logging lives for the whole process
            std::mem::forget(guard);

            Some(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(env_filter(&log_level)),
            )
        } else {
            None
        };

        if tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            log_dir = %log_dir.display(),
            file_output = config.file_output,
            "Structured logging initialized"
        );
    });
}

/// `RUST_LOG` wins over the configured level
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for shipment operations (merge, rates, purchase, batch)
pub fn log_shipment_operation(
    operation: &str,
    shipment: &str,
    item_ids: &[ItemId],
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        shipment = %shipment,
        item_ids = ?item_ids,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "SHIPMENT_OPERATION"
    );
}

/// Log structured data for label library operations (void, cancel, print)
pub fn log_label_operation(
    operation: &str,
    label: Option<LabelRef>,
    tracking_number: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    let label = label.map(|l| l.to_string());
    tracing::info!(
        operation = %operation,
        label = label.as_deref(),
        tracking_number = tracking_number,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "LABEL_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
