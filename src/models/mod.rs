//! # Data Models
//!
//! Orders, items, addresses and labels as stored in Postgres and returned by the shipping
//! API, plus the package and rate value types used by shipment forms.

pub mod address;
pub mod label;
pub mod order;
pub mod order_item;
pub mod package;
pub mod rate;

pub use address::{AddressField, NormalizedAddress, ShippingAddress};
pub use label::{Label, LabelId, LabelKind, LabelRef};
pub use order::{Order, OrderHeader, OrderId, OrderTab};
pub use order_item::{ItemId, OrderItem};
pub use package::{DimensionUnit, PackageField, PackageSpec, WeightUnit};
pub use rate::Rate;
