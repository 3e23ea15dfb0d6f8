use serde::{Deserialize, Serialize};

/// Events that drive order item status transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ItemEvent {
    /// A label was purchased for the item
    LabelPurchased {
        tracking_number: String,
        carrier: String,
    },
    /// The vendor entered a carrier tracking number by hand
    TrackingEntered {
        tracking_number: String,
        carrier: String,
    },
    /// The label covering this item was voided from the label library
    Void,
    /// The shipment was cancelled from the shipped orders view
    Cancel,
}

impl ItemEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::LabelPurchased { .. } => "label_purchased",
            Self::TrackingEntered { .. } => "tracking_entered",
            Self::Void => "void",
            Self::Cancel => "cancel",
        }
    }

    /// Tracking details carried by shipping events
    pub fn tracking(&self) -> Option<(&str, &str)> {
        match self {
            Self::LabelPurchased {
                tracking_number,
                carrier,
            }
            | Self::TrackingEntered {
                tracking_number,
                carrier,
            } => Some((tracking_number, carrier)),
            _ => None,
        }
    }

    /// Check if this event reverts a shipment
    pub fn is_reversal(&self) -> bool {
        matches!(self, Self::Void | Self::Cancel)
    }
}

/// Events that drive label status transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelEvent {
    Void,
}

impl LabelEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Void => "void",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tracking_details() {
        let event = ItemEvent::LabelPurchased {
            tracking_number: "794600000001".to_string(),
            carrier: "FedEx".to_string(),
        };
        assert_eq!(event.tracking(), Some(("794600000001", "FedEx")));
        assert_eq!(event.event_type(), "label_purchased");
        assert!(!event.is_reversal());

        assert_eq!(ItemEvent::Void.tracking(), None);
        assert!(ItemEvent::Cancel.is_reversal());
    }

    #[test]
    fn test_event_serde_shape() {
        let json = serde_json::to_value(ItemEvent::TrackingEntered {
            tracking_number: "1Z999".to_string(),
            carrier: "UPS".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "tracking_entered");
        assert_eq!(json["data"]["carrier"], "UPS");
    }
}
