//! Eligibility Service

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{Span, error};

use crate::{
    database::Db,
    domain::{
        coupons::{
            data::normalize_code,
            records::{CouponRecord, CouponUuid},
            repository::PgCouponsRepository,
        },
        eligibility::{
            EligibilityServiceError,
            data::{CouponLookup, EligibilityContext, LedgerFacts},
            decision::Decision,
            rules::evaluate,
        },
        usages::repository::PgUsagesRepository,
    },
};

/// Result of a read-only eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The resolved coupon, absent when the lookup found nothing.
    pub coupon: Option<CouponUuid>,
    pub decision: Decision,

    /// Discount the coupon would grant, when eligible and an order value was given.
    pub discount: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PgEligibilityService {
    db: Db,
    coupons: PgCouponsRepository,
    usages: PgUsagesRepository,
}

impl PgEligibilityService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            coupons: PgCouponsRepository::new(),
            usages: PgUsagesRepository::new(),
        }
    }
}

#[async_trait]
impl EligibilityService for PgEligibilityService {
    #[tracing::instrument(
        name = "eligibility.service.evaluate",
        skip(self, lookup, context),
        fields(
            coupon_uuid = tracing::field::Empty,
            has_user = context.user.is_some(),
            has_asset = context.asset.is_some(),
            eligible = tracing::field::Empty,
            reason_count = tracing::field::Empty
        ),
        err
    )]
    async fn evaluate(
        &self,
        lookup: CouponLookup,
        context: EligibilityContext,
        at: Timestamp,
    ) -> Result<Evaluation, EligibilityServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = match lookup {
            CouponLookup::Uuid(uuid) => self.coupons.find_coupon(&mut tx, uuid).await?,
            CouponLookup::Code(code) => {
                self.coupons
                    .find_coupon_by_code(&mut tx, &normalize_code(&code))
                    .await?
            }
        };

        let span = Span::current();

        let Some(coupon) = coupon else {
            tx.commit().await?;

            span.record("eligible", false);
            span.record("reason_count", 1);

            return Ok(Evaluation {
                coupon: None,
                decision: Decision::not_found(),
                discount: None,
            });
        };

        span.record("coupon_uuid", tracing::field::display(coupon.uuid));

        check_usage_invariant(&coupon)?;

        let facts = load_ledger_facts(&self.usages, &mut tx, &coupon, &context).await?;

        tx.commit().await?;

        let decision = evaluate(Some(&coupon), &context, &facts, at);

        span.record("eligible", decision.is_eligible());
        span.record("reason_count", decision.reasons().len());

        let discount = context
            .order_value
            .filter(|_| decision.is_eligible())
            .map(|order_value| coupon.discount.discount_for(order_value));

        Ok(Evaluation {
            coupon: Some(coupon.uuid),
            decision,
            discount,
        })
    }
}

#[automock]
#[async_trait]
pub trait EligibilityService: Send + Sync {
    /// Decide whether a coupon may be used in `context` at `at`, without taking locks
    /// or writing anything.
    async fn evaluate(
        &self,
        lookup: CouponLookup,
        context: EligibilityContext,
        at: Timestamp,
    ) -> Result<Evaluation, EligibilityServiceError>;
}

/// Load the ledger counts the rules need for this coupon and context.
pub(crate) async fn load_ledger_facts(
    usages: &PgUsagesRepository,
    tx: &mut Transaction<'_, Postgres>,
    coupon: &CouponRecord,
    context: &EligibilityContext,
) -> Result<LedgerFacts, sqlx::Error> {
    let required = LedgerFacts::required(coupon, context);

    let mut facts = LedgerFacts::default();

    let Some(user) = context.user.as_ref().filter(|_| required.any()) else {
        return Ok(facts);
    };

    if required.user_coupon_usages {
        facts.user_coupon_usages = usages
            .count_user_coupon_usages(tx, coupon.uuid, user)
            .await?;
    }

    if required.user_usages {
        facts.user_usages = usages.count_user_usages(tx, user).await?;
    }

    Ok(facts)
}

/// Report a counter past its limit. Never repaired here.
pub(crate) fn check_usage_invariant(coupon: &CouponRecord) -> Result<(), EligibilityServiceError> {
    match coupon.usage_limit {
        Some(usage_limit) if coupon.exceeds_usage_limit() => {
            error!(
                coupon_uuid = %coupon.uuid,
                usage_count = coupon.usage_count,
                usage_limit,
                "coupon usage count exceeds its limit"
            );

            Err(EligibilityServiceError::UsageInvariantViolated {
                coupon: coupon.uuid,
                usage_count: coupon.usage_count,
                usage_limit,
            })
        }
        _ => Ok(()),
    }
}
