//! Redemptions service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{
    coupons::records::CouponUuid,
    eligibility::EligibilityServiceError,
    usages::{data::UsageStatus, records::UsageUuid},
};

/// SQLSTATEs that mean "try again": serialization failure, deadlock, lock timeout.
const TRANSIENT_SQLSTATES: [&str; 3] = ["40001", "40P01", "55P03"];

#[derive(Debug, Error)]
pub enum RedemptionsServiceError {
    #[error("redemption could not complete, retry")]
    Transient(#[source] Error),

    #[error("redemption already recorded")]
    AlreadyExists,

    #[error("redemption not found")]
    NotFound,

    #[error("redemption is {from}, cannot become {to}")]
    InvalidTransition { from: UsageStatus, to: UsageStatus },

    #[error("coupon {coupon} usage count {usage_count} exceeds its limit {usage_limit}")]
    UsageInvariantViolated {
        coupon: CouponUuid,
        usage_count: u64,
        usage_limit: u64,
    },

    #[error("coupon {coupon} usage count disagrees with its ledger at usage {usage}")]
    UsageCountDrift { coupon: CouponUuid, usage: UsageUuid },

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl RedemptionsServiceError {
    /// Whether the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

fn is_transient(error: &Error) -> bool {
    match error {
        Error::PoolTimedOut | Error::Io(_) => true,
        Error::Database(db) => db
            .code()
            .is_some_and(|code| TRANSIENT_SQLSTATES.iter().any(|transient| *transient == code)),
        _ => false,
    }
}

impl From<Error> for RedemptionsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if is_transient(&error) {
            return Self::Transient(error);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<EligibilityServiceError> for RedemptionsServiceError {
    fn from(error: EligibilityServiceError) -> Self {
        match error {
            EligibilityServiceError::UsageInvariantViolated {
                coupon,
                usage_count,
                usage_limit,
            } => Self::UsageInvariantViolated {
                coupon,
                usage_count,
                usage_limit,
            },
            EligibilityServiceError::Sql(error) => error.into(),
        }
    }
}
