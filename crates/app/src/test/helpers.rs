//! Test Helpers

use jiff::{SignedDuration, Timestamp};

use crate::domain::coupons::{
    data::{CouponKind, GlobalApplication, NewCoupon, discounts::SimpleDiscount},
    records::{CouponRecord, CouponUuid},
};

const DAY: SignedDuration = SignedDuration::from_hours(24);

/// A live public coupon with no limits, valid from 400 days ago until 30 days from now.
pub(crate) fn new_coupon(code: &str) -> NewCoupon {
    let now = Timestamp::now();

    NewCoupon {
        uuid: CouponUuid::new(),
        code: code.to_string(),
        name: format!("{} coupon", code.trim()),
        description: None,
        kind: CouponKind::Public,
        discount: SimpleDiscount::PercentageOff { percentage: 10 },
        is_active: true,
        valid_from: now - DAY * 400,
        valid_until: now + DAY * 30,
        usage_limit: None,
        user_usage_limit: None,
        minimum_order_value: None,
        maximum_order_value: None,
        allowed_users: Vec::new(),
        global_application: GlobalApplication::default(),
        applicable_assets: Vec::new(),
        partner: None,
        organization: None,
    }
}

/// An in-memory record equivalent to [`new_coupon`], with its window anchored on `at`.
pub(crate) fn coupon_record(code: &str, at: Timestamp) -> CouponRecord {
    let coupon = new_coupon(code);

    CouponRecord {
        uuid: coupon.uuid,
        code: coupon.code,
        name: coupon.name,
        description: coupon.description,
        kind: coupon.kind,
        discount: coupon.discount,
        is_active: coupon.is_active,
        valid_from: at - DAY * 400,
        valid_until: at + DAY * 30,
        usage_limit: coupon.usage_limit,
        usage_count: 0,
        user_usage_limit: coupon.user_usage_limit,
        minimum_order_value: coupon.minimum_order_value,
        maximum_order_value: coupon.maximum_order_value,
        allowed_users: coupon.allowed_users,
        global_application: coupon.global_application,
        applicable_assets: coupon.applicable_assets,
        partner: coupon.partner,
        organization: coupon.organization,
        created_at: at,
        updated_at: at,
        deleted_at: None,
    }
}
