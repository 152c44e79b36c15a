//! Coupons Data

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    coupons::{
        data::{
            assets::{AssetKind, AssetRef},
            discounts::SimpleDiscount,
        },
        records::CouponUuid,
    },
    users::UserId,
};

pub mod assets;
pub mod discounts;

/// Customer segment a coupon is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouponKind {
    Public,
    Private,
    FirstPurchase,
    ReturningCustomer,
}

impl CouponKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::FirstPurchase => "first_purchase",
            Self::ReturningCustomer => "returning_customer",
        }
    }

    /// Whether the kind is decided by the user's redemption history across all coupons.
    #[must_use]
    pub const fn is_segment_rule(self) -> bool {
        matches!(self, Self::FirstPurchase | Self::ReturningCustomer)
    }
}

impl Display for CouponKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown coupon type `{0}`")]
pub struct UnknownCouponKind(pub String);

impl FromStr for CouponKind {
    type Err = UnknownCouponKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "first_purchase" => Ok(Self::FirstPurchase),
            "returning_customer" => Ok(Self::ReturningCustomer),
            other => Err(UnknownCouponKind(other.to_owned())),
        }
    }
}

/// Type-wide applicability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalApplication {
    pub is_global: bool,
    pub asset_kinds: SmallVec<[AssetKind; 5]>,
}

impl GlobalApplication {
    #[must_use]
    pub fn covers(&self, kind: AssetKind) -> bool {
        self.is_global && self.asset_kinds.contains(&kind)
    }
}

/// Explicit per-item applicability entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicableAsset {
    pub asset: AssetRef,
    pub is_active: bool,
}

impl ApplicableAsset {
    #[must_use]
    pub fn active(asset: AssetRef) -> Self {
        Self {
            asset,
            is_active: true,
        }
    }
}

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
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
    pub user_usage_limit: Option<u64>,
    pub minimum_order_value: Option<u64>,
    pub maximum_order_value: Option<u64>,
    pub allowed_users: Vec<UserId>,
    pub global_application: GlobalApplication,
    pub applicable_assets: Vec<ApplicableAsset>,
    pub partner: Option<Uuid>,
    pub organization: Option<Uuid>,
}

/// Coupon listing filter; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CouponFilter {
    pub partner: Option<Uuid>,
    pub organization: Option<Uuid>,
}

/// Normalize a coupon code the way it is stored: trimmed and uppercased.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
