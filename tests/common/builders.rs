use chrono::{Duration, Utc};
use fulfillment_core::models::{
    Label, LabelId, LabelKind, Order, OrderId, OrderItem, PackageField, Rate, ShippingAddress,
};
use fulfillment_core::state_machine::{ItemStatus, LabelStatus};

pub fn address(street: &str) -> ShippingAddress {
    ShippingAddress {
        recipient_name: Some("Jo Maker".to_string()),
        street: street.to_string(),
        line2: None,
        city: "Portland".to_string(),
        state: "OR".to_string(),
        zip: "97201".to_string(),
        country: "US".to_string(),
    }
}

pub fn pending_item(item_id: i64, order_id: OrderId) -> OrderItem {
    OrderItem {
        item_id,
        order_id,
        product_id: item_id * 100,
        product_name: format!("Print #{item_id}"),
        quantity: 1,
        item_status: ItemStatus::Pending,
        tracking_number: None,
        carrier: None,
    }
}

pub fn shipped_item(item_id: i64, order_id: OrderId, carrier: Option<&str>) -> OrderItem {
    OrderItem {
        item_status: ItemStatus::Shipped,
        tracking_number: Some(format!("1Z{item_id}")),
        carrier: carrier.map(str::to_string),
        ..pending_item(item_id, order_id)
    }
}

/// An order whose items all go to `street`
pub fn order(order_id: OrderId, street: Option<&str>, items: Vec<OrderItem>) -> Order {
    Order {
        order_id,
        customer_name: "Jo Maker".to_string(),
        shipping_address: street.map(address),
        order_status: "paid".to_string(),
        created_at: Utc::now() - Duration::hours(order_id),
        items,
    }
}

/// Two orders to the same street and one elsewhere: items 11, 12 | 21 | 31
pub fn unshipped_orders() -> Vec<Order> {
    vec![
        order(1, Some("12 Elm St"), vec![pending_item(11, 1), pending_item(12, 1)]),
        order(2, Some("  12  elm st "), vec![pending_item(21, 2)]),
        order(3, Some("9 Oak Ave"), vec![pending_item(31, 3)]),
    ]
}

pub fn rate(carrier: &str, service: &str, cost: f64) -> Rate {
    Rate {
        carrier: carrier.to_string(),
        service: service.to_string(),
        service_code: Some(service.to_lowercase().replace(' ', "_")),
        cost,
        currency: "USD".to_string(),
        estimated_delivery: None,
    }
}

/// Field edits that make the first package complete
pub fn complete_package_fields() -> Vec<PackageField> {
    vec![
        PackageField::Length(10.0),
        PackageField::Width(8.0),
        PackageField::Height(4.0),
        PackageField::Weight(2.5),
    ]
}

pub fn label(kind: LabelKind, id: LabelId, minutes_ago: i64, status: LabelStatus) -> Label {
    Label {
        id,
        kind,
        order_id: (kind == LabelKind::Order).then_some(1),
        order_item_id: (kind == LabelKind::Order).then_some(11),
        label_id: (kind == LabelKind::Standalone).then(|| format!("se-{id}")),
        carrier: Some("UPS".to_string()),
        service_name: "Ground".to_string(),
        tracking_number: format!("TRK-{kind}-{id}"),
        cost: 9.25,
        label_file_path: Some(format!("/labels/user_7/{kind}-{id}.pdf")),
        status,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
        customer_name: None,
        product_name: None,
        quantity: Some(1),
    }
}
