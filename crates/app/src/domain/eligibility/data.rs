//! Eligibility Data

use crate::domain::{
    coupons::{
        data::assets::AssetRef,
        records::{CouponRecord, CouponUuid},
    },
    users::UserId,
};

/// Request context a coupon is evaluated against. Every field is optional; rules
/// that need a missing field are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityContext {
    pub user: Option<UserId>,
    pub asset: Option<AssetRef>,

    /// An asset was named that resolves to no known [`AssetRef`], such as an
    /// unsupported type or a type without an id. No coupon applies to it.
    pub unrecognized_asset: bool,

    pub order_value: Option<u64>,
}

/// How the caller identifies the coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponLookup {
    Uuid(CouponUuid),
    Code(String),
}

/// Usage ledger counts consumed by the per-user and customer segment rules.
///
/// Counts exclude cancelled entries. A count the caller did not load reads as zero,
/// so callers load whatever [`LedgerFacts::required`] asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerFacts {
    /// Entries for this user on this coupon.
    pub user_coupon_usages: u64,

    /// Entries for this user across every coupon.
    pub user_usages: u64,
}

/// Which ledger counts a given evaluation needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredFacts {
    pub user_coupon_usages: bool,
    pub user_usages: bool,
}

impl RequiredFacts {
    #[must_use]
    pub const fn any(self) -> bool {
        self.user_coupon_usages || self.user_usages
    }
}

impl LedgerFacts {
    #[must_use]
    pub fn required(coupon: &CouponRecord, context: &EligibilityContext) -> RequiredFacts {
        if context.user.is_none() {
            return RequiredFacts::default();
        }

        RequiredFacts {
            user_coupon_usages: coupon.user_usage_limit.is_some(),
            user_usages: coupon.kind.is_segment_rule(),
        }
    }
}
