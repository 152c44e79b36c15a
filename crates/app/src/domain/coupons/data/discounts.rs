//! Coupon Discounts

/// Simple Discount Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleDiscount {
    PercentageOff { percentage: u16 },
    FixedAmountOff { amount: u64 },
}

impl SimpleDiscount {
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::PercentageOff { .. } => "percentage_off",
            Self::FixedAmountOff { .. } => "amount_off",
        }
    }

    /// Discount this coupon would grant on an order of `order_value` minor units.
    ///
    /// Percentages round down; the result never exceeds the order value.
    #[must_use]
    pub fn discount_for(&self, order_value: u64) -> u64 {
        match self {
            Self::PercentageOff { percentage } => {
                let discount = u128::from(order_value) * u128::from(*percentage) / 100;

                u64::try_from(discount).map_or(order_value, |d| d.min(order_value))
            }
            Self::FixedAmountOff { amount } => (*amount).min(order_value),
        }
    }
}
