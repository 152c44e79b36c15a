//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use coupons_app::{
    context::AppContext,
    domain::{
        analytics::MockAnalyticsService,
        coupons::{
            MockCouponsService,
            data::{CouponKind, GlobalApplication, discounts::SimpleDiscount},
            records::{CouponRecord, CouponUuid},
        },
        eligibility::MockEligibilityService,
        redemptions::MockRedemptionsService,
        usages::{
            data::UsageStatus,
            records::{UsageRecord, UsageUuid},
        },
    },
};

use crate::state::State;

/// Mocks backing one test service. Unset expectations panic when called.
#[derive(Default)]
pub(crate) struct Mocks {
    pub coupons: MockCouponsService,
    pub eligibility: MockEligibilityService,
    pub redemptions: MockRedemptionsService,
    pub analytics: MockAnalyticsService,
}

impl Mocks {
    pub(crate) fn with_coupons(coupons: MockCouponsService) -> Self {
        Self {
            coupons,
            ..Self::default()
        }
    }

    pub(crate) fn with_eligibility(eligibility: MockEligibilityService) -> Self {
        Self {
            eligibility,
            ..Self::default()
        }
    }

    pub(crate) fn with_redemptions(redemptions: MockRedemptionsService) -> Self {
        Self {
            redemptions,
            ..Self::default()
        }
    }

    pub(crate) fn with_analytics(analytics: MockAnalyticsService) -> Self {
        Self {
            analytics,
            ..Self::default()
        }
    }

    fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            coupons: Arc::new(self.coupons),
            eligibility: Arc::new(self.eligibility),
            redemptions: Arc::new(self.redemptions),
            analytics: Arc::new(self.analytics),
        })
    }
}

pub(crate) fn test_service(mocks: Mocks, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(mocks.into_state())).push(route))
}

pub(crate) fn make_coupon(uuid: CouponUuid) -> CouponRecord {
    CouponRecord {
        uuid,
        code: "SUMMER10".to_string(),
        name: "Summer".to_string(),
        description: None,
        kind: CouponKind::Public,
        discount: SimpleDiscount::PercentageOff { percentage: 10 },
        is_active: true,
        valid_from: Timestamp::UNIX_EPOCH,
        valid_until: Timestamp::MAX,
        usage_limit: Some(100),
        usage_count: 3,
        user_usage_limit: None,
        minimum_order_value: None,
        maximum_order_value: None,
        allowed_users: Vec::new(),
        global_application: GlobalApplication::default(),
        applicable_assets: Vec::new(),
        partner: None,
        organization: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

pub(crate) fn make_usage(uuid: UsageUuid, coupon: CouponUuid, status: UsageStatus) -> UsageRecord {
    UsageRecord {
        uuid,
        coupon,
        user: "user-1".into(),
        status,
        discount_amount: 1_000,
        original_amount: 10_000,
        applied_at: Timestamp::UNIX_EPOCH,
        status_changed_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
