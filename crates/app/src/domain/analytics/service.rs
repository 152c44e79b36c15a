//! Analytics Service
//!
//! Read-only aggregation over the usage ledger. Runs outside the redemption path
//! and takes no locks.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::Span;

use crate::{
    database::Db,
    domain::{
        analytics::{
            AnalyticsServiceError,
            data::{AnalyticsScope, AnalyticsSnapshot, ScopeAnalytics, TOP_COUPONS_LIMIT},
            repository::PgAnalyticsRepository,
        },
        coupons::{records::CouponUuid, repository::PgCouponsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgAnalyticsService {
    db: Db,
    analytics: PgAnalyticsRepository,
    coupons: PgCouponsRepository,
}

impl PgAnalyticsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            analytics: PgAnalyticsRepository::new(),
            coupons: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl AnalyticsService for PgAnalyticsService {
    #[tracing::instrument(
        name = "analytics.service.coupon_analytics",
        skip(self),
        fields(coupon_uuid = %coupon, total_usages = tracing::field::Empty),
        err
    )]
    async fn coupon_analytics(
        &self,
        coupon: CouponUuid,
        at: Timestamp,
    ) -> Result<AnalyticsSnapshot, AnalyticsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .coupons
            .find_coupon(&mut tx, coupon)
            .await?
            .ok_or(AnalyticsServiceError::NotFound)?;

        let totals = self.analytics.coupon_usage_totals(&mut tx, coupon, at).await?;

        tx.commit().await?;

        Span::current().record("total_usages", totals.total_usages);

        Ok(totals.snapshot(record.usage_limit))
    }

    #[tracing::instrument(
        name = "analytics.service.scope_analytics",
        skip(self),
        fields(
            partner_uuid = ?scope.partner,
            organization_uuid = ?scope.organization,
            total_usages = tracing::field::Empty
        ),
        err
    )]
    async fn scope_analytics(
        &self,
        scope: AnalyticsScope,
        at: Timestamp,
    ) -> Result<ScopeAnalytics, AnalyticsServiceError> {
        if let (Some(from), Some(until)) = (scope.from, scope.until)
            && from > until
        {
            return Err(AnalyticsServiceError::InvalidData);
        }

        let mut tx = self.db.begin().await?;

        let totals = self.analytics.scope_usage_totals(&mut tx, scope, at).await?;

        let top_coupons = self
            .analytics
            .top_coupons(&mut tx, scope, TOP_COUPONS_LIMIT)
            .await?;

        let coupons = self.analytics.scope_coupon_counts(&mut tx, scope, at).await?;

        tx.commit().await?;

        Span::current().record("total_usages", totals.total_usages);

        Ok(ScopeAnalytics {
            snapshot: totals.snapshot(None),
            top_coupons,
            coupons,
        })
    }
}

#[automock]
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Metrics for a single live coupon.
    async fn coupon_analytics(
        &self,
        coupon: CouponUuid,
        at: Timestamp,
    ) -> Result<AnalyticsSnapshot, AnalyticsServiceError>;

    /// Metrics for every live coupon in a partner/organization scope.
    async fn scope_analytics(
        &self,
        scope: AnalyticsScope,
        at: Timestamp,
    ) -> Result<ScopeAnalytics, AnalyticsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, ToSpan};
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        domain::{
            coupons::{CouponsService, data::NewCoupon, records::CouponRecord},
            redemptions::{
                RedemptionsService,
                data::{NewRedemption, Redemption},
            },
            usages::records::{UsageRecord, UsageUuid},
        },
        test::{TestContext, helpers::new_coupon},
    };

    use super::*;

    async fn redeem(
        ctx: &TestContext,
        coupon: &CouponRecord,
        user: &str,
        discount_amount: u64,
        at: Timestamp,
    ) -> TestResult<UsageRecord> {
        let outcome = ctx
            .redemptions
            .redeem(
                coupon.uuid,
                NewRedemption {
                    uuid: UsageUuid::new(),
                    user: user.into(),
                    asset: None,
                    unrecognized_asset: false,
                    order_value: None,
                    discount_amount,
                    original_amount: 20_000,
                },
                at,
            )
            .await?;

        match outcome {
            Redemption::Applied(usage) => Ok(usage),
            Redemption::Rejected(decision) => Err(format!("rejected: {decision:?}").into()),
        }
    }

    fn scoped(code: &str, partner: Uuid) -> NewCoupon {
        let mut coupon = new_coupon(code);

        coupon.partner = Some(partner);

        coupon
    }

    #[tokio::test]
    async fn coupon_analytics_sums_applied_usages() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let mut coupon = new_coupon("TOTALS");

        coupon.usage_limit = Some(8);

        let coupon = ctx.coupons.create_coupon(coupon).await?;

        for (user, discount) in [("u1", 10), ("u2", 20), ("u3", 30), ("u4", 40)] {
            redeem(&ctx, &coupon, user, discount, now).await?;
        }

        let snapshot = ctx.analytics.coupon_analytics(coupon.uuid, now).await?;

        assert_eq!(snapshot.total_usages, 4);
        assert_eq!(snapshot.total_discount_given, 100);
        assert_eq!(snapshot.average_discount_amount, 25);
        assert_eq!(snapshot.total_order_value, 80_000);
        assert_eq!(snapshot.average_order_value, 20_000);
        assert_eq!(snapshot.usage_rate, Some(0.5));
        assert_eq!(snapshot.recent_usages, 4);

        Ok(())
    }

    #[tokio::test]
    async fn coupon_analytics_separates_refunds_and_ignores_cancellations() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let coupon = ctx.coupons.create_coupon(new_coupon("MIXED")).await?;

        redeem(&ctx, &coupon, "u1", 100, now).await?;
        let refunded = redeem(&ctx, &coupon, "u2", 200, now).await?;
        let cancelled = redeem(&ctx, &coupon, "u3", 300, now).await?;

        ctx.redemptions.refund(refunded.uuid, now).await?;
        ctx.redemptions.cancel(cancelled.uuid, now).await?;

        let snapshot = ctx.analytics.coupon_analytics(coupon.uuid, now).await?;

        assert_eq!(snapshot.total_usages, 1);
        assert_eq!(snapshot.total_refunds, 1);
        assert_eq!(snapshot.total_discount_given, 100);
        assert_eq!(snapshot.usage_rate, None);

        Ok(())
    }

    #[tokio::test]
    async fn recent_usages_cover_trailing_thirty_days() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let coupon = ctx.coupons.create_coupon(new_coupon("RECENT")).await?;

        redeem(&ctx, &coupon, "u1", 100, now - SignedDuration::from_hours(24 * 45)).await?;
        redeem(&ctx, &coupon, "u2", 100, now - SignedDuration::from_hours(24 * 29)).await?;
        redeem(&ctx, &coupon, "u3", 100, now - 1.hour()).await?;

        let snapshot = ctx.analytics.coupon_analytics(coupon.uuid, now).await?;

        assert_eq!(snapshot.total_usages, 3);
        assert_eq!(snapshot.recent_usages, 2);

        Ok(())
    }

    #[tokio::test]
    async fn coupon_analytics_unknown_coupon_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .analytics
            .coupon_analytics(CouponUuid::new(), Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(AnalyticsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn scope_analytics_ranks_top_coupons() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();
        let partner = Uuid::now_v7();

        let busy = ctx.coupons.create_coupon(scoped("BUSY", partner)).await?;
        let quiet = ctx.coupons.create_coupon(scoped("QUIET", partner)).await?;
        let other = ctx.coupons.create_coupon(new_coupon("OTHER")).await?;

        for user in ["u1", "u2", "u3"] {
            redeem(&ctx, &busy, user, 100, now).await?;
        }

        redeem(&ctx, &quiet, "u1", 50, now).await?;
        redeem(&ctx, &other, "u1", 999, now).await?;

        let report = ctx
            .analytics
            .scope_analytics(
                AnalyticsScope {
                    partner: Some(partner),
                    ..AnalyticsScope::default()
                },
                now,
            )
            .await?;

        assert_eq!(report.snapshot.total_usages, 4);
        assert_eq!(report.snapshot.total_discount_given, 350);
        assert_eq!(report.snapshot.usage_rate, None);
        assert_eq!(report.coupons.total_coupons, 2);
        assert_eq!(report.coupons.active_coupons, 2);
        assert_eq!(report.coupons.expired_coupons, 0);

        let ranked: Vec<(&str, u64)> = report
            .top_coupons
            .iter()
            .map(|top| (top.code.as_str(), top.usages))
            .collect();

        assert_eq!(ranked, vec![("BUSY", 3), ("QUIET", 1)]);

        Ok(())
    }

    #[tokio::test]
    async fn top_coupon_ties_break_by_uuid() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();
        let partner = Uuid::now_v7();

        let mut created = Vec::new();

        for code in ["T1", "T2", "T3", "T4", "T5", "T6"] {
            let coupon = ctx.coupons.create_coupon(scoped(code, partner)).await?;

            redeem(&ctx, &coupon, "u1", 10, now).await?;

            created.push(coupon.uuid);
        }

        created.sort();

        let report = ctx
            .analytics
            .scope_analytics(
                AnalyticsScope {
                    partner: Some(partner),
                    ..AnalyticsScope::default()
                },
                now,
            )
            .await?;

        let top: Vec<CouponUuid> = report.top_coupons.iter().map(|top| top.coupon).collect();

        assert_eq!(top, created[..5].to_vec());

        Ok(())
    }

    #[tokio::test]
    async fn scope_date_range_filters_applied_at() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();
        let organization = Uuid::now_v7();

        let mut coupon = new_coupon("RANGE");

        coupon.organization = Some(organization);

        let coupon = ctx.coupons.create_coupon(coupon).await?;

        redeem(&ctx, &coupon, "u1", 100, now - SignedDuration::from_hours(24 * 10)).await?;
        redeem(&ctx, &coupon, "u2", 100, now - 1.hour()).await?;

        let report = ctx
            .analytics
            .scope_analytics(
                AnalyticsScope {
                    organization: Some(organization),
                    from: Some(now - SignedDuration::from_hours(24)),
                    until: Some(now),
                    ..AnalyticsScope::default()
                },
                now,
            )
            .await?;

        assert_eq!(report.snapshot.total_usages, 1);
        assert_eq!(report.top_coupons.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn scope_counts_expired_and_excludes_deleted() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();
        let partner = Uuid::now_v7();

        let mut expired = scoped("GONE", partner);

        expired.valid_until = now - 1.hour();

        ctx.coupons.create_coupon(expired).await?;

        let mut inactive = scoped("OFF", partner);

        inactive.is_active = false;

        ctx.coupons.create_coupon(inactive).await?;

        let deleted = ctx.coupons.create_coupon(scoped("DEL", partner)).await?;

        ctx.coupons.delete_coupon(deleted.uuid).await?;

        let report = ctx
            .analytics
            .scope_analytics(
                AnalyticsScope {
                    partner: Some(partner),
                    ..AnalyticsScope::default()
                },
                now,
            )
            .await?;

        assert_eq!(report.coupons.total_coupons, 2);
        assert_eq!(report.coupons.active_coupons, 0);
        assert_eq!(report.coupons.expired_coupons, 1);
        assert_eq!(report.snapshot.total_usages, 0);
        assert_eq!(report.snapshot.average_order_value, 0);
        assert!(report.top_coupons.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn scope_rejects_inverted_range() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let result = ctx
            .analytics
            .scope_analytics(
                AnalyticsScope {
                    from: Some(now),
                    until: Some(now - 1.hour()),
                    ..AnalyticsScope::default()
                },
                now,
            )
            .await;

        assert!(
            matches!(result, Err(AnalyticsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }
}
