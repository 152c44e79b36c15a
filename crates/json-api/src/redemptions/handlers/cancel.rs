//! Cancel Redemption Handler

use jiff::Timestamp;
use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    redemptions::{errors::respond_with_error, models::UsageResponse},
};

/// Cancel Redemption Handler
///
/// Releases the unit of capacity the redemption consumed. Only applied redemptions may be cancelled.
#[endpoint(
    tags("redemptions"),
    summary = "Cancel Redemption",
    responses(
        (status_code = StatusCode::OK, description = "Redemption cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Redemption not found"),
        (status_code = StatusCode::CONFLICT, description = "Redemption is not applied"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Contended, retry later"),
    ),
)]
#[tracing::instrument(
    name = "redemptions.cancel",
    skip(usage, depot, res),
    fields(usage_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    usage: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<UsageResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let usage = usage.into_inner();

    tracing::Span::current().record("usage_uuid", tracing::field::display(usage));

    let usage = match state.app.redemptions.cancel(usage.into(), Timestamp::now()).await {
        Ok(usage) => usage,
        Err(error) => return Err(respond_with_error(res, error)),
    };

    tracing::info!(usage_uuid = %usage.uuid, coupon_uuid = %usage.coupon, "cancelled redemption");

    Ok(Json(usage.into()))
}
