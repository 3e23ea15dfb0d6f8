#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Fulfillment Core Rust
//!
//! Shipping label and rate acquisition for marketplace vendors, with batch fulfillment.
//!
//! ## Overview
//!
//! A vendor works through their unshipped order items: items going to the same address can
//! be merged into one shipment, each shipment gets a form with packages, carrier rates are
//! quoted, and a label is bought or a tracking number entered by hand. Completed forms can
//! be submitted together in one batch. Purchased labels are listed in a label library where
//! they can be voided or combined into one printable document.
//!
//! ## Module Organization
//!
//! - [`fulfillment`] - Session reducer, merge rules, rate and purchase planning, batch
//!   submission, the label library, and the async workbench that drives them
//! - [`client`] - Typed client for the remote shipping API
//! - [`models`] - Orders, items, addresses, labels, packages and rates
//! - [`state_machine`] - Item shipment status and label lifecycle transitions
//! - [`config`] - Layered YAML configuration with environment overrides
//! - [`events`] - Lifecycle event broadcasting
//! - [`logging`] - Structured logging setup and operation helpers
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fulfillment_core::client::ShippingApiClient;
//! use fulfillment_core::config::ConfigManager;
//! use fulfillment_core::events::EventPublisher;
//! use fulfillment_core::fulfillment::{AccountCapabilities, FulfillmentWorkbench};
//! use fulfillment_core::models::OrderTab;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//!
//! let client = ShippingApiClient::new(&config.shipping_api)?;
//! let workbench = FulfillmentWorkbench::new(
//!     Arc::new(client),
//!     config.shipping_api.clone(),
//!     AccountCapabilities::from_permissions(&["shipping", "stripe_connect"], true),
//!     EventPublisher::from_config(&config.events),
//! );
//!
//! workbench.refresh_orders(OrderTab::Unshipped).await?;
//! println!("{} unshipped items", workbench.session().unmerged_items().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests; ledger tests need DATABASE_URL and --ignored
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fulfillment;
pub mod logging;
pub mod models;
pub mod state_machine;

pub use client::{ClientError, ShippingApi, ShippingApiClient};
pub use config::{ConfigManager, ConfigurationError, FulfillmentConfig};
pub use constants::{Carrier, DEFAULT_CANCEL_CARRIER};
pub use error::{FulfillmentError, MergeError, Result};
pub use events::{EventPublisher, PublishedEvent};
pub use fulfillment::{
    Confirmation, FormKey, FulfillmentSession, FulfillmentWorkbench, GroupId, SessionAction,
    ShipmentLedger,
};
pub use logging::init_structured_logging;
pub use models::{Label, LabelRef, Order, OrderItem, OrderTab, PackageSpec, Rate};
pub use state_machine::{ItemStatus, LabelStatus};
