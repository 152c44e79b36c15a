//! Redemptions Service
//!
//! The only writer of the usage ledger and of `coupons.usage_count`.
//!
//! A redemption runs in one transaction with a bounded lock timeout. It takes a
//! per-user advisory lock first, then the coupon row lock, so one user's
//! redemptions are serialized (keeping cross-coupon history rules honest) while
//! unrelated users and coupons never contend.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction, query};
use tracing::{Span, error, info, warn};

use crate::{
    database::Db,
    domain::{
        coupons::{records::CouponUuid, repository::PgCouponsRepository},
        eligibility::{
            decision::{Decision, Reason},
            rules::evaluate,
            service::{check_usage_invariant, load_ledger_facts},
        },
        redemptions::{
            RedemptionsServiceError,
            data::{NewRedemption, Redemption},
        },
        usages::{
            data::{NewUsage, UsageDrift, UsageStatus},
            records::{UsageRecord, UsageUuid},
            repository::PgUsagesRepository,
        },
        users::UserId,
    },
};

const LOCK_USER_SQL: &str = include_str!("sql/lock_user.sql");

#[derive(Debug, Clone)]
pub struct PgRedemptionsService {
    db: Db,
    coupons: PgCouponsRepository,
    usages: PgUsagesRepository,
}

impl PgRedemptionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            coupons: PgCouponsRepository::new(),
            usages: PgUsagesRepository::new(),
        }
    }

    async fn transition(
        &self,
        usage: UsageUuid,
        to: UsageStatus,
        at: Timestamp,
    ) -> Result<(Transaction<'static, Postgres>, UsageRecord), RedemptionsServiceError> {
        let mut tx = self.db.begin_locking().await?;

        if let Some(record) = self.usages.transition_usage(&mut tx, usage, to, at).await? {
            return Ok((tx, record));
        }

        let existing = self.usages.find_usage(&mut tx, usage).await?;

        tx.rollback().await?;

        match existing {
            Some(record) => Err(RedemptionsServiceError::InvalidTransition {
                from: record.status,
                to,
            }),
            None => Err(RedemptionsServiceError::NotFound),
        }
    }
}

async fn lock_user(tx: &mut Transaction<'_, Postgres>, user: &UserId) -> Result<(), sqlx::Error> {
    query(LOCK_USER_SQL)
        .bind(user.as_str())
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[async_trait]
impl RedemptionsService for PgRedemptionsService {
    #[tracing::instrument(
        name = "redemptions.service.redeem",
        skip(self, redemption),
        fields(
            coupon_uuid = %coupon,
            usage_uuid = %redemption.uuid,
            applied = tracing::field::Empty,
            reason_count = tracing::field::Empty,
            usage_count = tracing::field::Empty
        ),
        err
    )]
    async fn redeem(
        &self,
        coupon: CouponUuid,
        redemption: NewRedemption,
        at: Timestamp,
    ) -> Result<Redemption, RedemptionsServiceError> {
        if redemption.discount_amount > redemption.original_amount {
            return Err(RedemptionsServiceError::InvalidData);
        }

        let span = Span::current();
        let context = redemption.context();

        let mut tx = self.db.begin_locking().await?;

        lock_user(&mut tx, &redemption.user).await?;

        if self
            .usages
            .find_usage(&mut tx, redemption.uuid)
            .await?
            .is_some()
        {
            tx.rollback().await?;

            return Err(RedemptionsServiceError::AlreadyExists);
        }

        let Some(record) = self.coupons.lock_coupon(&mut tx, coupon).await? else {
            tx.rollback().await?;

            span.record("applied", false);

            return Ok(Redemption::Rejected(Decision::not_found()));
        };

        check_usage_invariant(&record)?;

        let facts = load_ledger_facts(&self.usages, &mut tx, &record, &context).await?;

        let decision = evaluate(Some(&record), &context, &facts, at);

        if !decision.is_eligible() {
            tx.rollback().await?;

            span.record("applied", false);
            span.record("reason_count", decision.reasons().len());

            return Ok(Redemption::Rejected(decision));
        }

        let usage = self
            .usages
            .create_usage(
                &mut tx,
                NewUsage {
                    uuid: redemption.uuid,
                    coupon,
                    user: redemption.user,
                    discount_amount: redemption.discount_amount,
                    original_amount: redemption.original_amount,
                    applied_at: at,
                },
            )
            .await?;

        let Some(usage_count) = self.coupons.increment_usage_count(&mut tx, coupon).await? else {
            tx.rollback().await?;

            warn!(coupon_uuid = %coupon, "usage guard refused increment under row lock");

            span.record("applied", false);

            return Ok(Redemption::Rejected(Decision::from_reasons(vec![
                Reason::UsageLimitReached,
            ])));
        };

        tx.commit().await?;

        span.record("applied", true);
        span.record("usage_count", usage_count);

        info!(
            coupon_uuid = %coupon,
            usage_uuid = %usage.uuid,
            usage_count,
            "redeemed coupon"
        );

        Ok(Redemption::Applied(usage))
    }

    #[tracing::instrument(
        name = "redemptions.service.refund",
        skip(self),
        fields(usage_uuid = %usage, coupon_uuid = tracing::field::Empty),
        err
    )]
    async fn refund(
        &self,
        usage: UsageUuid,
        at: Timestamp,
    ) -> Result<UsageRecord, RedemptionsServiceError> {
        let (tx, record) = self.transition(usage, UsageStatus::Refunded, at).await?;

        Span::current().record("coupon_uuid", tracing::field::display(record.coupon));

        tx.commit().await?;

        info!(usage_uuid = %usage, coupon_uuid = %record.coupon, "refunded redemption");

        Ok(record)
    }

    #[tracing::instrument(
        name = "redemptions.service.cancel",
        skip(self),
        fields(
            usage_uuid = %usage,
            coupon_uuid = tracing::field::Empty,
            usage_count = tracing::field::Empty
        ),
        err
    )]
    async fn cancel(
        &self,
        usage: UsageUuid,
        at: Timestamp,
    ) -> Result<UsageRecord, RedemptionsServiceError> {
        let (mut tx, record) = self.transition(usage, UsageStatus::Cancelled, at).await?;

        let span = Span::current();

        span.record("coupon_uuid", tracing::field::display(record.coupon));

        let Some(usage_count) = self
            .coupons
            .decrement_usage_count(&mut tx, record.coupon)
            .await?
        else {
            tx.rollback().await?;

            error!(
                coupon_uuid = %record.coupon,
                usage_uuid = %usage,
                "usage count already zero while cancelling an applied redemption"
            );

            return Err(RedemptionsServiceError::UsageCountDrift {
                coupon: record.coupon,
                usage,
            });
        };

        tx.commit().await?;

        span.record("usage_count", usage_count);

        info!(
            usage_uuid = %usage,
            coupon_uuid = %record.coupon,
            usage_count,
            "cancelled redemption"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "redemptions.service.list_usages",
        skip(self),
        fields(coupon_uuid = %coupon, usage_count = tracing::field::Empty),
        err
    )]
    async fn list_usages(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<UsageRecord>, RedemptionsServiceError> {
        let mut tx = self.db.begin().await?;

        if self.coupons.find_coupon(&mut tx, coupon).await?.is_none() {
            return Err(RedemptionsServiceError::NotFound);
        }

        let usages = self.usages.list_usages(&mut tx, coupon).await?;

        tx.commit().await?;

        Span::current().record("usage_count", usages.len());

        Ok(usages)
    }

    #[tracing::instrument(
        name = "redemptions.service.find_usage_drift",
        skip(self),
        fields(drift_count = tracing::field::Empty),
        err
    )]
    async fn find_usage_drift(&self) -> Result<Vec<UsageDrift>, RedemptionsServiceError> {
        let mut tx = self.db.begin().await?;

        let drift = self.usages.find_usage_drift(&mut tx).await?;

        tx.commit().await?;

        Span::current().record("drift_count", drift.len());

        for entry in &drift {
            error!(
                coupon_uuid = %entry.coupon,
                code = %entry.code,
                usage_count = entry.usage_count,
                usage_limit = entry.usage_limit,
                ledger_count = entry.ledger_count,
                exceeds_usage_limit = entry.exceeds_usage_limit(),
                "coupon usage count disagrees with ledger"
            );
        }

        Ok(drift)
    }
}

#[automock]
#[async_trait]
pub trait RedemptionsService: Send + Sync {
    /// Re-evaluate the coupon and, when eligible, record the redemption and consume
    /// one unit of capacity atomically.
    async fn redeem(
        &self,
        coupon: CouponUuid,
        redemption: NewRedemption,
        at: Timestamp,
    ) -> Result<Redemption, RedemptionsServiceError>;

    /// Mark an applied redemption refunded. Capacity stays consumed.
    async fn refund(
        &self,
        usage: UsageUuid,
        at: Timestamp,
    ) -> Result<UsageRecord, RedemptionsServiceError>;

    /// Mark an applied redemption cancelled and release its unit of capacity.
    async fn cancel(
        &self,
        usage: UsageUuid,
        at: Timestamp,
    ) -> Result<UsageRecord, RedemptionsServiceError>;

    /// Ledger entries for a coupon, oldest first.
    async fn list_usages(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<UsageRecord>, RedemptionsServiceError>;

    /// Coupons whose counter disagrees with their ledger.
    async fn find_usage_drift(&self) -> Result<Vec<UsageDrift>, RedemptionsServiceError>;
}
