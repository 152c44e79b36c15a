//! Redemption Errors

use salvo::{
    http::{StatusError, header::RETRY_AFTER},
    prelude::Response,
};
use tracing::{error, warn};

use coupons_app::domain::redemptions::RedemptionsServiceError;

/// Seconds a client should wait before retrying a transient failure.
pub(crate) const RETRY_AFTER_SECONDS: u32 = 1;

/// Map a service error, adding `Retry-After` to `res` when the request may be retried.
pub(crate) fn respond_with_error(res: &mut Response, error: RedemptionsServiceError) -> StatusError {
    if error.is_retryable() && res.add_header(RETRY_AFTER, RETRY_AFTER_SECONDS, true).is_err() {
        error!("failed to set retry-after header");
    }

    into_status_error(error)
}

pub(crate) fn into_status_error(error: RedemptionsServiceError) -> StatusError {
    match error {
        RedemptionsServiceError::Transient(source) => {
            warn!("redemption contended, asking client to retry: {source}");

            StatusError::service_unavailable().brief("Redemption busy, retry")
        }
        RedemptionsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Redemption already recorded")
        }
        RedemptionsServiceError::NotFound => {
            StatusError::not_found().brief("Redemption not found")
        }
        RedemptionsServiceError::InvalidTransition { from, to } => StatusError::conflict()
            .brief("Redemption cannot change status")
            .detail(format!("redemption is {from}, cannot become {to}")),
        RedemptionsServiceError::InvalidReference
        | RedemptionsServiceError::MissingRequiredData
        | RedemptionsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid redemption payload")
        }
        RedemptionsServiceError::UsageInvariantViolated {
            coupon,
            usage_count,
            usage_limit,
        } => {
            error!(
                coupon_uuid = %coupon,
                usage_count,
                usage_limit,
                "refusing to redeem coupon past its usage limit"
            );

            StatusError::internal_server_error()
        }
        RedemptionsServiceError::UsageCountDrift { coupon, usage } => {
            error!(
                coupon_uuid = %coupon,
                usage_uuid = %usage,
                "usage count disagrees with ledger"
            );

            StatusError::internal_server_error()
        }
        RedemptionsServiceError::Sql(source) => {
            error!("redemption storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
