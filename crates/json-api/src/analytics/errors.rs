//! Analytics Errors

use salvo::http::StatusError;
use tracing::error;

use coupons_app::domain::analytics::AnalyticsServiceError;

pub(crate) fn into_status_error(error: AnalyticsServiceError) -> StatusError {
    match error {
        AnalyticsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        AnalyticsServiceError::InvalidData => {
            StatusError::bad_request().brief("\"from\" must not be after \"until\"")
        }
        AnalyticsServiceError::Sql(source) => {
            error!("analytics storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
