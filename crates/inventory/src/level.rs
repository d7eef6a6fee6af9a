use serde::{Deserialize, Serialize};

/// Units at or below this count (and above zero) are "low stock".
///
/// Platform-wide policy, not configurable per product.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Buyer-facing stock classification, a pure function of availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockLevel {
    pub fn classify(available: i64) -> Self {
        if available <= 0 {
            StockLevel::OutOfStock
        } else if available <= LOW_STOCK_THRESHOLD {
            StockLevel::LowStock
        } else {
            StockLevel::InStock
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_out_of_stock() {
        assert_eq!(StockLevel::classify(0), StockLevel::OutOfStock);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(StockLevel::classify(1), StockLevel::LowStock);
        assert_eq!(StockLevel::classify(10), StockLevel::LowStock);
        assert_eq!(StockLevel::classify(11), StockLevel::InStock);
    }
}
