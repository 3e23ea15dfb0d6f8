use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::order::OrderId;

/// Destination address attached to an order.
/// Maps to `shipping_addresses` table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromRow)]
pub struct ShippingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub street: String,
    #[serde(rename = "address_line_2", default, skip_serializing_if = "Option::is_none")]
    #[sqlx(rename = "address_line_2")]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
}

/// Comparison form of a [`ShippingAddress`].
///
/// Every field is trimmed, runs of internal whitespace are collapsed to a single space and
/// letters are upper-cased. A missing second line equals an empty one. The recipient name
/// is not part of the destination and is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedAddress {
    pub street: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Address fields compared when merging shipments, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Street,
    Line2,
    City,
    State,
    Zip,
    Country,
}

impl std::fmt::Display for AddressField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Street => "street",
            Self::Line2 => "address_line_2",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
            Self::Country => "country",
        };
        f.write_str(name)
    }
}

fn normalize_field(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

impl ShippingAddress {
    pub fn normalized(&self) -> NormalizedAddress {
        NormalizedAddress {
            street: normalize_field(&self.street),
            line2: normalize_field(self.line2.as_deref().unwrap_or_default()),
            city: normalize_field(&self.city),
            state: normalize_field(&self.state),
            zip: normalize_field(&self.zip),
            country: normalize_field(&self.country),
        }
    }

    /// Find the shipping address for an order
    pub async fn find_by_order(
        pool: &PgPool,
        order_id: OrderId,
    ) -> Result<Option<ShippingAddress>, sqlx::Error> {
        sqlx::query_as::<_, ShippingAddress>(
            r#"
            SELECT recipient_name, street, address_line_2, city, state, zip, country
            FROM shipping_addresses
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(pool)
        .await
    }
}

impl NormalizedAddress {
    /// First field that differs from `other`, if any
    pub fn first_difference(&self, other: &NormalizedAddress) -> Option<AddressField> {
        [
            (AddressField::Street, &self.street, &other.street),
            (AddressField::Line2, &self.line2, &other.line2),
            (AddressField::City, &self.city, &other.city),
            (AddressField::State, &self.state, &other.state),
            (AddressField::Zip, &self.zip, &other.zip),
            (AddressField::Country, &self.country, &other.country),
        ]
        .into_iter()
        .find(|(_, a, b)| a != b)
        .map(|(field, _, _)| field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(street: &str, line2: Option<&str>) -> ShippingAddress {
        ShippingAddress {
            recipient_name: Some("Ada".to_string()),
            street: street.to_string(),
            line2: line2.map(str::to_string),
            city: "Portland".to_string(),
            state: "OR".to_string(),
            zip: "97201".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_normalization_ignores_case_and_spacing() {
        let a = address("  12  Main st ", None);
        let b = address("12 MAIN ST", Some(""));
        assert_eq!(a.normalized(), b.normalized());
        assert_eq!(a.normalized().street, "12 MAIN ST");
    }

    #[test]
    fn test_first_difference_reports_field() {
        let a = address("12 Main St", Some("Apt 1"));
        let b = address("12 Main St", Some("Apt 2"));
        assert_eq!(
            a.normalized().first_difference(&b.normalized()),
            Some(AddressField::Line2)
        );
        assert_eq!(a.normalized().first_difference(&a.normalized()), None);
    }

    #[test]
    fn test_recipient_name_not_compared() {
        let a = address("12 Main St", None);
        let mut b = a.clone();
        b.recipient_name = Some("Grace".to_string());
        assert_eq!(a.normalized(), b.normalized());
    }

    #[test]
    fn test_deserializes_api_shape() {
        let json = r#"{"street":"1 Elm","address_line_2":"Unit 4","city":"Reno","state":"NV","zip":"89501","country":"US"}"#;
        let parsed: ShippingAddress = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.line2.as_deref(), Some("Unit 4"));
        assert_eq!(parsed.recipient_name, None);
    }
}
