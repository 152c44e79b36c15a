//! Coupon Errors

use salvo::http::StatusError;
use tracing::error;

use coupons_app::domain::{coupons::CouponsServiceError, eligibility::EligibilityServiceError};

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon code already in use")
        }
        CouponsServiceError::InvalidReference
        | CouponsServiceError::MissingRequiredData
        | CouponsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid coupon payload")
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        CouponsServiceError::Sql(source) => {
            error!("coupon storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn eligibility_status_error(error: EligibilityServiceError) -> StatusError {
    match error {
        EligibilityServiceError::UsageInvariantViolated {
            coupon,
            usage_count,
            usage_limit,
        } => {
            error!(
                coupon_uuid = %coupon,
                usage_count,
                usage_limit,
                "refusing to evaluate coupon past its usage limit"
            );

            StatusError::internal_server_error()
        }
        EligibilityServiceError::Sql(source) => {
            error!("eligibility storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
