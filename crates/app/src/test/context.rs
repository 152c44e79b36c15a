//! Test context for service-level integration tests.

use std::time::Duration;

use crate::{
    database::Db,
    domain::{
        analytics::PgAnalyticsService, coupons::PgCouponsService,
        eligibility::PgEligibilityService, redemptions::PgRedemptionsService,
    },
};

use super::db::TestDb;

/// Lock wait for redemption tests; long enough that contended tests rarely time out.
const TEST_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct TestContext {
    pub db: TestDb,
    pub coupons: PgCouponsService,
    pub eligibility: PgEligibilityService,
    pub redemptions: PgRedemptionsService,
    pub analytics: PgAnalyticsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;

        let db = Db::new(test_db.pool().clone()).with_lock_timeout(TEST_LOCK_TIMEOUT);

        Self {
            coupons: PgCouponsService::new(db.clone()),
            eligibility: PgEligibilityService::new(db.clone()),
            redemptions: PgRedemptionsService::new(db.clone()),
            analytics: PgAnalyticsService::new(db),
            db: test_db,
        }
    }
}
