//! Eligibility Rules
//!
//! Rules run in a fixed order and never short-circuit, except for an unknown or
//! deleted coupon, so callers see every blocking condition at once.

use jiff::Timestamp;

use crate::domain::{
    coupons::{data::CouponKind, records::CouponRecord},
    eligibility::{
        data::{EligibilityContext, LedgerFacts},
        decision::{Decision, Reason},
    },
};

/// Evaluate `coupon` against `context` at the instant `at`.
///
/// Pure: the same inputs always produce the same [`Decision`].
#[must_use]
pub fn evaluate(
    coupon: Option<&CouponRecord>,
    context: &EligibilityContext,
    facts: &LedgerFacts,
    at: Timestamp,
) -> Decision {
    let Some(coupon) = coupon.filter(|coupon| !coupon.is_deleted()) else {
        return Decision::not_found();
    };

    let mut reasons = Vec::new();

    if !coupon.is_active {
        reasons.push(Reason::Inactive);
    }

    if !coupon.is_within_window(at) {
        reasons.push(if at < coupon.valid_from {
            Reason::NotYetValid
        } else {
            Reason::Expired
        });
    }

    if coupon.is_exhausted() {
        reasons.push(Reason::UsageLimitReached);
    }

    if let Some(order_value) = context.order_value {
        if let Some(minimum) = coupon.minimum_order_value
            && order_value < minimum
        {
            reasons.push(Reason::BelowMinimumOrderValue { minimum });
        }

        if let Some(maximum) = coupon.maximum_order_value
            && order_value > maximum
        {
            reasons.push(Reason::AboveMaximumOrderValue { maximum });
        }
    }

    if context.unrecognized_asset {
        reasons.push(Reason::NotApplicable);
    } else if let Some(asset) = &context.asset {
        let covered_globally = coupon.global_application.covers(asset.kind());

        let listed = coupon
            .applicable_assets
            .iter()
            .any(|applicable| applicable.is_active && applicable.asset == *asset);

        if !covered_globally && !listed {
            reasons.push(Reason::NotApplicable);
        }
    }

    if let Some(user) = &context.user {
        if let Some(limit) = coupon.user_usage_limit
            && facts.user_coupon_usages >= limit
        {
            reasons.push(Reason::UserUsageLimitReached);
        }

        if coupon.kind == CouponKind::Private && !coupon.allowed_users.contains(user) {
            reasons.push(Reason::UserNotAllowed);
        }

        match coupon.kind {
            CouponKind::FirstPurchase if facts.user_usages > 0 => {
                reasons.push(Reason::FirstPurchaseOnly);
            }
            CouponKind::ReturningCustomer if facts.user_usages == 0 => {
                reasons.push(Reason::ReturningCustomersOnly);
            }
            _ => {}
        }
    }

    Decision::from_reasons(reasons)
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use smallvec::smallvec;

    use crate::{
        domain::coupons::data::{
            ApplicableAsset, GlobalApplication,
            assets::{AssetKind, AssetRef},
        },
        test::helpers::coupon_record,
    };

    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_second(1_750_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    fn context() -> EligibilityContext {
        EligibilityContext::default()
    }

    fn user_context(user: &str) -> EligibilityContext {
        EligibilityContext {
            user: Some(user.into()),
            ..EligibilityContext::default()
        }
    }

    #[test]
    fn plain_public_coupon_is_eligible() {
        let coupon = coupon_record("OPEN", now());

        let decision = evaluate(Some(&coupon), &context(), &LedgerFacts::default(), now());

        assert!(decision.is_eligible(), "{decision:?}");
    }

    #[test]
    fn missing_coupon_short_circuits() {
        let decision = evaluate(None, &context(), &LedgerFacts::default(), now());

        assert_eq!(decision.reasons(), [Reason::NotFound]);
        assert!(decision.is_not_found());
    }

    #[test]
    fn deleted_coupon_short_circuits_even_when_other_rules_fail() {
        let mut coupon = coupon_record("OLD", now());

        coupon.is_active = false;
        coupon.deleted_at = Some(now());

        let decision = evaluate(Some(&coupon), &context(), &LedgerFacts::default(), now());

        assert_eq!(decision.reasons(), [Reason::NotFound]);
    }

    #[test]
    fn inactive_coupon_fails() {
        let mut coupon = coupon_record("OFF", now());

        coupon.is_active = false;

        let decision = evaluate(Some(&coupon), &context(), &LedgerFacts::default(), now());

        assert_eq!(decision.reasons(), [Reason::Inactive]);
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let mut coupon = coupon_record("EDGE", now());

        coupon.valid_from = now();
        coupon.valid_until = now() + 1.hour();

        let facts = LedgerFacts::default();

        assert!(evaluate(Some(&coupon), &context(), &facts, coupon.valid_from).is_eligible());
        assert!(evaluate(Some(&coupon), &context(), &facts, coupon.valid_until).is_eligible());

        let early = evaluate(
            Some(&coupon),
            &context(),
            &facts,
            coupon.valid_from - 1.millisecond(),
        );
        let late = evaluate(
            Some(&coupon),
            &context(),
            &facts,
            coupon.valid_until + 1.millisecond(),
        );

        assert_eq!(early.reasons(), [Reason::NotYetValid]);
        assert_eq!(late.reasons(), [Reason::Expired]);
    }

    #[test]
    fn exhausted_global_limit_fails_with_stable_message() {
        let mut coupon = coupon_record("FULL", now());

        coupon.usage_limit = Some(2);
        coupon.usage_count = 2;

        let decision = evaluate(Some(&coupon), &context(), &LedgerFacts::default(), now());

        assert!(!decision.is_eligible());
        assert_eq!(decision.messages(), ["Limite de uso atingido"]);
    }

    #[test]
    fn remaining_capacity_passes() {
        let mut coupon = coupon_record("ROOM", now());

        coupon.usage_limit = Some(2);
        coupon.usage_count = 1;

        let decision = evaluate(Some(&coupon), &context(), &LedgerFacts::default(), now());

        assert!(decision.is_eligible(), "{decision:?}");
    }

    #[test]
    fn order_below_minimum_names_the_minimum() {
        let mut coupon = coupon_record("MIN", now());

        coupon.minimum_order_value = Some(10_000);

        let ctx = EligibilityContext {
            order_value: Some(5_000),
            ..EligibilityContext::default()
        };

        let decision = evaluate(Some(&coupon), &ctx, &LedgerFacts::default(), now());

        assert_eq!(
            decision.reasons(),
            [Reason::BelowMinimumOrderValue { minimum: 10_000 }]
        );
        assert!(
            decision.messages().iter().any(|message| message.contains("100")),
            "{:?}",
            decision.messages()
        );
    }

    #[test]
    fn order_above_maximum_fails() {
        let mut coupon = coupon_record("MAX", now());

        coupon.maximum_order_value = Some(10_000);

        let ctx = EligibilityContext {
            order_value: Some(10_001),
            ..EligibilityContext::default()
        };

        let decision = evaluate(Some(&coupon), &ctx, &LedgerFacts::default(), now());

        assert_eq!(
            decision.reasons(),
            [Reason::AboveMaximumOrderValue { maximum: 10_000 }]
        );
    }

    #[test]
    fn order_bounds_are_skipped_without_order_value() {
        let mut coupon = coupon_record("NOVALUE", now());

        coupon.minimum_order_value = Some(10_000);

        let decision = evaluate(Some(&coupon), &context(), &LedgerFacts::default(), now());

        assert!(decision.is_eligible(), "{decision:?}");
    }

    #[test]
    fn explicit_asset_list_scopes_applicability() {
        let mut coupon = coupon_record("A1ONLY", now());

        coupon.applicable_assets = vec![ApplicableAsset::active(AssetRef::new(
            AssetKind::Activities,
            "A1",
        ))];

        let other = EligibilityContext {
            asset: Some(AssetRef::new(AssetKind::Events, "E1")),
            ..EligibilityContext::default()
        };

        let listed = EligibilityContext {
            asset: Some(AssetRef::new(AssetKind::Activities, "A1")),
            ..EligibilityContext::default()
        };

        let facts = LedgerFacts::default();

        let rejected = evaluate(Some(&coupon), &other, &facts, now());

        assert_eq!(rejected.reasons(), [Reason::NotApplicable]);
        assert_eq!(rejected.messages(), ["Cupom não aplicável a este item"]);
        assert!(evaluate(Some(&coupon), &listed, &facts, now()).is_eligible());
    }

    #[test]
    fn inactive_asset_entry_does_not_apply() {
        let mut coupon = coupon_record("PAUSED", now());

        coupon.applicable_assets = vec![ApplicableAsset {
            asset: AssetRef::new(AssetKind::Activities, "A1"),
            is_active: false,
        }];

        let ctx = EligibilityContext {
            asset: Some(AssetRef::new(AssetKind::Activities, "A1")),
            ..EligibilityContext::default()
        };

        let decision = evaluate(Some(&coupon), &ctx, &LedgerFacts::default(), now());

        assert_eq!(decision.reasons(), [Reason::NotApplicable]);
    }

    #[test]
    fn same_id_under_another_kind_does_not_apply() {
        let mut coupon = coupon_record("KINDS", now());

        coupon.applicable_assets = vec![ApplicableAsset::active(AssetRef::new(
            AssetKind::Activities,
            "X1",
        ))];

        let ctx = EligibilityContext {
            asset: Some(AssetRef::new(AssetKind::Vehicles, "X1")),
            ..EligibilityContext::default()
        };

        let decision = evaluate(Some(&coupon), &ctx, &LedgerFacts::default(), now());

        assert_eq!(decision.reasons(), [Reason::NotApplicable]);
    }

    #[test]
    fn global_application_covers_listed_kinds_only() {
        let mut coupon = coupon_record("GLOBAL", now());

        coupon.global_application = GlobalApplication {
            is_global: true,
            asset_kinds: smallvec![AssetKind::Restaurants],
        };

        let restaurant = EligibilityContext {
            asset: Some(AssetRef::new(AssetKind::Restaurants, "R9")),
            ..EligibilityContext::default()
        };

        let package = EligibilityContext {
            asset: Some(AssetRef::new(AssetKind::Packages, "P1")),
            ..EligibilityContext::default()
        };

        let facts = LedgerFacts::default();

        assert!(evaluate(Some(&coupon), &restaurant, &facts, now()).is_eligible());
        assert_eq!(
            evaluate(Some(&coupon), &package, &facts, now()).reasons(),
            [Reason::NotApplicable]
        );
    }

    #[test]
    fn unrecognized_asset_is_never_applicable() {
        let mut coupon = coupon_record("ANYWHERE", now());

        coupon.is_active = false;
        coupon.global_application = GlobalApplication {
            is_global: true,
            asset_kinds: smallvec![AssetKind::Events, AssetKind::Activities],
        };

        let ctx = EligibilityContext {
            unrecognized_asset: true,
            ..EligibilityContext::default()
        };

        let decision = evaluate(Some(&coupon), &ctx, &LedgerFacts::default(), now());

        assert_eq!(decision.reasons(), [Reason::Inactive, Reason::NotApplicable]);
    }

    #[test]
    fn per_user_limit_counts_prior_usages() {
        let mut coupon = coupon_record("ONCE", now());

        coupon.user_usage_limit = Some(1);

        let ctx = user_context("user-1");

        let fresh = LedgerFacts::default();
        let used = LedgerFacts {
            user_coupon_usages: 1,
            user_usages: 1,
        };

        assert!(evaluate(Some(&coupon), &ctx, &fresh, now()).is_eligible());
        assert_eq!(
            evaluate(Some(&coupon), &ctx, &used, now()).reasons(),
            [Reason::UserUsageLimitReached]
        );
    }

    #[test]
    fn per_user_limit_needs_a_user() {
        let mut coupon = coupon_record("ANON", now());

        coupon.user_usage_limit = Some(1);

        let facts = LedgerFacts {
            user_coupon_usages: 5,
            user_usages: 5,
        };

        assert!(evaluate(Some(&coupon), &context(), &facts, now()).is_eligible());
    }

    #[test]
    fn private_coupon_requires_allowlisted_user() {
        let mut coupon = coupon_record("VIP", now());

        coupon.kind = CouponKind::Private;
        coupon.allowed_users = vec!["vip-1".into()];

        let facts = LedgerFacts::default();

        assert!(evaluate(Some(&coupon), &user_context("vip-1"), &facts, now()).is_eligible());

        let outsider = evaluate(Some(&coupon), &user_context("someone"), &facts, now());

        assert_eq!(outsider.reasons(), [Reason::UserNotAllowed]);
        assert!(evaluate(Some(&coupon), &context(), &facts, now()).is_eligible());
    }

    #[test]
    fn first_purchase_and_returning_customer_are_mirror_images() {
        let mut first = coupon_record("FIRST", now());
        first.kind = CouponKind::FirstPurchase;

        let mut returning = coupon_record("BACK", now());
        returning.kind = CouponKind::ReturningCustomer;

        let ctx = user_context("user-1");

        let newcomer = LedgerFacts::default();
        let customer = LedgerFacts {
            user_coupon_usages: 0,
            user_usages: 1,
        };

        assert!(evaluate(Some(&first), &ctx, &newcomer, now()).is_eligible());
        assert_eq!(
            evaluate(Some(&returning), &ctx, &newcomer, now()).reasons(),
            [Reason::ReturningCustomersOnly]
        );

        assert_eq!(
            evaluate(Some(&first), &ctx, &customer, now()).reasons(),
            [Reason::FirstPurchaseOnly]
        );
        assert!(evaluate(Some(&returning), &ctx, &customer, now()).is_eligible());
    }

    #[test]
    fn every_failed_rule_is_reported_in_order() {
        let mut coupon = coupon_record("BROKEN", now());

        coupon.is_active = false;
        coupon.valid_until = now() - 1.hour();
        coupon.valid_from = now() - 2.hours();
        coupon.applicable_assets = vec![ApplicableAsset::active(AssetRef::new(
            AssetKind::Activities,
            "A1",
        ))];

        let ctx = EligibilityContext {
            asset: Some(AssetRef::new(AssetKind::Events, "E1")),
            ..EligibilityContext::default()
        };

        let decision = evaluate(Some(&coupon), &ctx, &LedgerFacts::default(), now());

        assert_eq!(
            decision.reasons(),
            [Reason::Inactive, Reason::Expired, Reason::NotApplicable]
        );
        assert_eq!(
            decision.messages(),
            [
                "Cupom inativo",
                "Cupom expirado",
                "Cupom não aplicável a este item"
            ]
        );
    }

    #[test]
    fn evaluation_is_repeatable() {
        let mut coupon = coupon_record("SAME", now());

        coupon.usage_limit = Some(1);
        coupon.usage_count = 1;
        coupon.kind = CouponKind::FirstPurchase;

        let ctx = user_context("user-1");
        let facts = LedgerFacts {
            user_coupon_usages: 0,
            user_usages: 3,
        };

        let first = evaluate(Some(&coupon), &ctx, &facts, now());
        let second = evaluate(Some(&coupon), &ctx, &facts, now());

        assert_eq!(first, second);
    }
}
