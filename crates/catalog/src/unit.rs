use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyflow_core::{AggregateId, DomainError, DomainResult, ValueObject};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product variant identifier (size, pack, flavour...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub AggregateId);

impl VariantId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for VariantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identity of the atomic thing stock is tracked against: a product, or one
/// specific variant of it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitRef {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
}

impl UnitRef {
    pub fn product(product_id: ProductId) -> Self {
        Self {
            product_id,
            variant_id: None,
        }
    }

    pub fn variant(product_id: ProductId, variant_id: VariantId) -> Self {
        Self {
            product_id,
            variant_id: Some(variant_id),
        }
    }
}

impl ValueObject for UnitRef {}

impl core::fmt::Display for UnitRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.variant_id {
            Some(v) => write!(f, "{}/{}", self.product_id, v),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// Catalog view of a sellable unit.
///
/// Price is `base_price + price_adjustment`; the adjustment is zero for a
/// plain product and may be negative for a cheaper variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellableUnit {
    unit: UnitRef,
    name: String,
    base_price: Decimal,
    price_adjustment: Decimal,
}

impl SellableUnit {
    pub fn new(unit: UnitRef, name: impl Into<String>, base_price: Decimal) -> DomainResult<Self> {
        Self::with_adjustment(unit, name, base_price, Decimal::ZERO)
    }

    pub fn with_adjustment(
        unit: UnitRef,
        name: impl Into<String>,
        base_price: Decimal,
        price_adjustment: Decimal,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if base_price.is_sign_negative() {
            return Err(DomainError::validation("base_price cannot be negative"));
        }
        if unit.variant_id.is_none() && !price_adjustment.is_zero() {
            return Err(DomainError::validation(
                "price_adjustment only applies to variants",
            ));
        }
        if (base_price + price_adjustment).is_sign_negative() {
            return Err(DomainError::validation("effective price cannot be negative"));
        }

        Ok(Self {
            unit,
            name,
            base_price,
            price_adjustment,
        })
    }

    pub fn unit(&self) -> UnitRef {
        self.unit
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_price(&self) -> Decimal {
        self.base_price
    }

    pub fn price_adjustment(&self) -> Decimal {
        self.price_adjustment
    }

    /// Price a buyer pays for one unit right now.
    pub fn effective_price(&self) -> Decimal {
        self.base_price + self.price_adjustment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn variant() -> VariantId {
        VariantId::new(AggregateId::new())
    }

    #[test]
    fn variant_price_adds_adjustment_to_base() {
        let unit = UnitRef::variant(product(), variant());
        let su = SellableUnit::with_adjustment(unit, "Fries 5kg", dec!(20.00), dec!(2.50)).unwrap();
        assert_eq!(su.effective_price(), dec!(22.50));
    }

    #[test]
    fn discounted_variant_may_lower_price() {
        let unit = UnitRef::variant(product(), variant());
        let su = SellableUnit::with_adjustment(unit, "Fries 1kg", dec!(20.00), dec!(-15.00)).unwrap();
        assert_eq!(su.effective_price(), dec!(5.00));
    }

    #[test]
    fn adjustment_on_plain_product_is_rejected() {
        let err = SellableUnit::with_adjustment(UnitRef::product(product()), "Oil", dec!(10), dec!(1))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_effective_price_is_rejected() {
        let unit = UnitRef::variant(product(), variant());
        assert!(SellableUnit::with_adjustment(unit, "Buns", dec!(1), dec!(-2)).is_err());
    }

    #[test]
    fn product_and_variant_refs_are_distinct_units() {
        let p = product();
        let v = variant();
        assert_ne!(UnitRef::product(p), UnitRef::variant(p, v));
    }

    #[test]
    fn plain_unit_serializes_without_variant_field() {
        let unit = UnitRef::product(product());
        let json = serde_json::to_value(unit).unwrap();
        assert!(json.get("variant_id").is_none());
    }
}
