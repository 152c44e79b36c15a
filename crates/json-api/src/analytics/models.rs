//! Analytics response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons_app::domain::analytics::data::{
    AnalyticsSnapshot, CouponCounts, ScopeAnalytics, TopCoupon,
};

/// Usage metrics. Amounts are minor units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SnapshotResponse {
    /// Applied redemptions
    pub total_usages: u64,
    pub total_refunds: u64,
    pub total_discount_given: u64,
    pub total_order_value: u64,
    pub average_order_value: u64,
    pub average_discount_amount: u64,
    /// Applied usages over the usage limit; absent for unlimited coupons and tenant scopes
    pub usage_rate: Option<f64>,
    /// Applied usages in the 30 days before the evaluation instant
    pub recent_usages: u64,
}

impl From<AnalyticsSnapshot> for SnapshotResponse {
    fn from(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            total_usages: snapshot.total_usages,
            total_refunds: snapshot.total_refunds,
            total_discount_given: snapshot.total_discount_given,
            total_order_value: snapshot.total_order_value,
            average_order_value: snapshot.average_order_value,
            average_discount_amount: snapshot.average_discount_amount,
            usage_rate: snapshot.usage_rate,
            recent_usages: snapshot.recent_usages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TopCouponResponse {
    pub coupon_uuid: Uuid,
    pub code: String,
    pub name: String,
    pub usages: u64,
}

impl From<TopCoupon> for TopCouponResponse {
    fn from(top: TopCoupon) -> Self {
        Self {
            coupon_uuid: top.coupon.into(),
            code: top.code,
            name: top.name,
            usages: top.usages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponCountsResponse {
    pub total_coupons: u64,
    pub active_coupons: u64,
    pub expired_coupons: u64,
}

impl From<CouponCounts> for CouponCountsResponse {
    fn from(counts: CouponCounts) -> Self {
        Self {
            total_coupons: counts.total_coupons,
            active_coupons: counts.active_coupons,
            expired_coupons: counts.expired_coupons,
        }
    }
}

/// Tenant Analytics Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ScopeAnalyticsResponse {
    #[serde(flatten)]
    pub snapshot: SnapshotResponse,
    /// Most redeemed coupons, at most five
    pub top_coupons: Vec<TopCouponResponse>,
    pub coupons: CouponCountsResponse,
}

impl From<ScopeAnalytics> for ScopeAnalyticsResponse {
    fn from(analytics: ScopeAnalytics) -> Self {
        Self {
            snapshot: analytics.snapshot.into(),
            top_coupons: analytics.top_coupons.into_iter().map(Into::into).collect(),
            coupons: analytics.coupons.into(),
        }
    }
}
