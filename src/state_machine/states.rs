use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfillment status of a single order item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Awaiting a label or tracking number
    Pending,
    /// Label purchased or tracking entered
    Shipped,
    /// Delivered, set by carrier updates outside this crate
    Delivered,
}

impl ItemStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Items in this state can be merged, rated and labeled
    pub fn is_shippable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Items in this state carry a label or tracking number that can be cancelled
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Shipped)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("Invalid item status: {s}")),
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Lifecycle status of a purchased shipping label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStatus {
    Active,
    Voided,
}

impl LabelStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Voided)
    }
}

impl fmt::Display for LabelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Voided => write!(f, "voided"),
        }
    }
}

impl std::str::FromStr for LabelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "voided" => Ok(Self::Voided),
            _ => Err(format!("Invalid label status: {s}")),
        }
    }
}

impl Default for LabelStatus {
    fn default() -> Self {
        Self::Active
    }
}
