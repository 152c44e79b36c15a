//! Eligibility service errors.

use thiserror::Error;

use crate::domain::coupons::records::CouponUuid;

#[derive(Debug, Error)]
pub enum EligibilityServiceError {
    /// The stored counter is past the coupon's limit: some write bypassed redemption.
    #[error("coupon {coupon} usage count {usage_count} exceeds its limit {usage_limit}")]
    UsageInvariantViolated {
        coupon: CouponUuid,
        usage_count: u64,
        usage_limit: u64,
    },

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
