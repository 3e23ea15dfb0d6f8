use proptest::prelude::*;

use fulfillment_core::models::{DimensionUnit, PackageSpec, ShippingAddress, WeightUnit};

/// Strategy for address words in mixed case
pub fn address_word_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,10}"
}

/// Strategy for whitespace padding of up to four spaces or tabs
pub fn padding_strategy() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

/// Strategy for a street made of one to four words
pub fn street_words_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(address_word_strategy(), 1..4)
}

/// Strategy for generating shipping addresses
pub fn address_strategy() -> impl Strategy<Value = ShippingAddress> {
    (
        street_words_strategy(),
        prop::option::of(address_word_strategy()),
        address_word_strategy(),
        "[A-Z]{2}",
        "[0-9]{5}",
    )
        .prop_map(|(street, line2, city, state, zip)| ShippingAddress {
            recipient_name: None,
            street: street.join(" "),
            line2,
            city,
            state,
            zip,
            country: "US".to_string(),
        })
}

/// Strategy for positive package measures
pub fn measure_strategy() -> impl Strategy<Value = f64> {
    0.1f64..500.0
}

/// Strategy for generating complete packages
pub fn complete_package_strategy() -> impl Strategy<Value = PackageSpec> {
    (
        measure_strategy(),
        measure_strategy(),
        measure_strategy(),
        measure_strategy(),
        prop_oneof![Just(DimensionUnit::In), Just(DimensionUnit::Cm)],
        prop_oneof![Just(WeightUnit::Lb), Just(WeightUnit::Oz), Just(WeightUnit::Kg)],
    )
        .prop_map(|(length, width, height, weight, dim_unit, weight_unit)| PackageSpec {
            length,
            width,
            height,
            dim_unit,
            weight,
            weight_unit,
        })
}

/// Strategy for a measure that makes a package incomplete
pub fn invalid_measure_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        -500.0f64..0.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
    ]
}
