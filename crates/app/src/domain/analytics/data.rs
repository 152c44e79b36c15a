//! Analytics Data

use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::coupons::records::CouponUuid;

/// Number of coupons reported in [`ScopeAnalytics::top_coupons`].
pub const TOP_COUPONS_LIMIT: u8 = 5;

/// Tenant scope. `None` filters match everything; the date range bounds `applied_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsScope {
    pub partner: Option<Uuid>,
    pub organization: Option<Uuid>,
    pub from: Option<Timestamp>,
    pub until: Option<Timestamp>,
}

/// Raw ledger aggregates, as summed by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub total_usages: u64,
    pub total_refunds: u64,
    pub total_discount_given: u64,
    pub total_order_value: u64,
    pub recent_usages: u64,
}

impl UsageTotals {
    /// Derive averages and the usage rate. `usage_limit` is `None` for tenant scopes
    /// and unlimited coupons, which leaves the rate undefined.
    #[must_use]
    pub fn snapshot(&self, usage_limit: Option<u64>) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            total_usages: self.total_usages,
            total_refunds: self.total_refunds,
            total_discount_given: self.total_discount_given,
            total_order_value: self.total_order_value,
            average_order_value: average(self.total_order_value, self.total_usages),
            average_discount_amount: average(self.total_discount_given, self.total_usages),
            usage_rate: usage_limit
                .filter(|limit| *limit > 0)
                .map(|limit| self.total_usages as f64 / limit as f64),
            recent_usages: self.recent_usages,
        }
    }
}

/// `total / count` rounded half up, zero when there is nothing to divide by.
fn average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }

    let rounded = (u128::from(total) + u128::from(count) / 2) / u128::from(count);

    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Reporting metrics for one coupon or one tenant scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_usages: u64,
    pub total_refunds: u64,
    pub total_discount_given: u64,
    pub total_order_value: u64,
    pub average_order_value: u64,
    pub average_discount_amount: u64,
    pub usage_rate: Option<f64>,
    pub recent_usages: u64,
}

/// A coupon ranked by applied usages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCoupon {
    pub coupon: CouponUuid,
    pub code: String,
    pub name: String,
    pub usages: u64,
}

/// Coupon population of a tenant scope at the evaluation instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CouponCounts {
    pub total_coupons: u64,
    pub active_coupons: u64,
    pub expired_coupons: u64,
}

/// Tenant scope report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeAnalytics {
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
    pub top_coupons: Vec<TopCoupon>,
    pub coupons: CouponCounts,
}
