//! Coupons Records

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    domain::{
        coupons::data::{
            ApplicableAsset, CouponKind, GlobalApplication, discounts::SimpleDiscount,
        },
        users::UserId,
    },
    uuids::TypedUuid,
};

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: CouponKind,
    pub discount: SimpleDiscount,
    pub is_active: bool,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub usage_limit: Option<u64>,
    pub usage_count: u64,
    pub user_usage_limit: Option<u64>,
    pub minimum_order_value: Option<u64>,
    pub maximum_order_value: Option<u64>,
    pub allowed_users: Vec<UserId>,
    pub global_application: GlobalApplication,
    pub applicable_assets: Vec<ApplicableAsset>,
    pub partner: Option<Uuid>,
    pub organization: Option<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl CouponRecord {
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the global limit is already consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// `usage_count` past `usage_limit`; only reachable if a write bypassed redemption.
    #[must_use]
    pub fn exceeds_usage_limit(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.usage_count > limit)
    }

    #[must_use]
    pub fn is_within_window(&self, at: Timestamp) -> bool {
        self.valid_from <= at && at <= self.valid_until
    }
}
