use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    In,
    Cm,
}

impl Default for DimensionUnit {
    fn default() -> Self {
        Self::In
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Lb,
    Oz,
    Kg,
}

impl Default for WeightUnit {
    fn default() -> Self {
        Self::Lb
    }
}

/// Dimensions and weight of one physical parcel in a shipment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub dim_unit: DimensionUnit,
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
}

/// A single editable attribute of a package
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PackageField {
    Length(f64),
    Width(f64),
    Height(f64),
    DimUnit(DimensionUnit),
    Weight(f64),
    WeightUnit(WeightUnit),
}

impl PackageSpec {
    /// A package is complete when every measure is a positive finite number
    pub fn is_complete(&self) -> bool {
        [self.length, self.width, self.height, self.weight]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    pub fn apply(&mut self, field: PackageField) {
        match field {
            PackageField::Length(v) => self.length = v,
            PackageField::Width(v) => self.width = v,
            PackageField::Height(v) => self.height = v,
            PackageField::DimUnit(u) => self.dim_unit = u,
            PackageField::Weight(v) => self.weight = v,
            PackageField::WeightUnit(u) => self.weight_unit = u,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_package_is_incomplete() {
        let pkg = PackageSpec::default();
        assert!(!pkg.is_complete());
        assert_eq!(pkg.dim_unit, DimensionUnit::In);
        assert_eq!(pkg.weight_unit, WeightUnit::Lb);
    }

    #[test]
    fn test_apply_fields() {
        let mut pkg = PackageSpec::default();
        pkg.apply(PackageField::Length(10.0));
        pkg.apply(PackageField::Width(8.0));
        pkg.apply(PackageField::Height(4.0));
        assert!(!pkg.is_complete());
        pkg.apply(PackageField::Weight(2.5));
        pkg.apply(PackageField::WeightUnit(WeightUnit::Kg));
        assert!(pkg.is_complete());
        assert_eq!(pkg.weight_unit, WeightUnit::Kg);

        pkg.apply(PackageField::Height(f64::NAN));
        assert!(!pkg.is_complete());
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let pkg = PackageSpec {
            length: 1.0,
            width: 2.0,
            height: 3.0,
            dim_unit: DimensionUnit::Cm,
            weight: 4.0,
            weight_unit: WeightUnit::Oz,
        };
        let json = serde_json::to_value(&pkg).unwrap();
        assert_eq!(json["dimUnit"], "cm");
        assert_eq!(json["weightUnit"], "oz");
    }
}
