use serde::{Deserialize, Serialize};

/// A priced carrier service option returned by the rate aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub carrier: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_code: Option<String>,
    pub cost: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Rate {
    /// Rates within a form are identified by service name
    pub fn same_service(&self, other: &Rate) -> bool {
        self.service == other.service
    }
}
