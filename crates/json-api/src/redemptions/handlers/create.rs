//! Redeem Coupon Handler

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use coupons_app::domain::redemptions::data::{NewRedemption, Redemption};

use crate::{
    coupons::models::DecisionResponse,
    extensions::*,
    observability::{RedemptionOutcome, observe_redemption},
    redemptions::{
        errors::respond_with_error,
        models::{RedeemCouponRequest, UsageResponse},
    },
};

/// Redeem Coupon Handler
///
/// Re-evaluates the coupon and records the usage atomically. A rejected coupon
/// answers 422 with the decision; a missing one answers 404.
#[endpoint(
    tags("redemptions"),
    summary = "Redeem Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Redemption applied"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon not eligible"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::CONFLICT, description = "Redemption id reused"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Contended, retry later"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
#[tracing::instrument(
    name = "redemptions.create",
    skip(coupon, json, depot, res),
    fields(coupon_uuid = tracing::field::Empty, usage_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    json: JsonBody<RedeemCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.state_or_500()?;
    let coupon = coupon.into_inner();
    let redemption = NewRedemption::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("coupon_uuid", tracing::field::display(coupon));
    span.record("usage_uuid", tracing::field::display(redemption.uuid));

    let outcome = state
        .app
        .redemptions
        .redeem(coupon.into(), redemption, Timestamp::now())
        .await;

    match outcome {
        Ok(Redemption::Applied(usage)) => {
            observe_redemption(RedemptionOutcome::Applied);

            res.add_header(LOCATION, format!("/redemptions/{}", usage.uuid), true)
                .or_500("failed to set location header")?
                .status_code(StatusCode::CREATED);

            res.render(Json(UsageResponse::from(usage)));

            Ok(())
        }
        Ok(Redemption::Rejected(decision)) => {
            observe_redemption(RedemptionOutcome::Rejected);

            let status = if decision.is_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };

            res.status_code(status);
            res.render(Json(DecisionResponse::from(&decision)));

            Ok(())
        }
        Err(error) => {
            if error.is_retryable() {
                observe_redemption(RedemptionOutcome::Transient);
            }

            Err(respond_with_error(res, error))
        }
    }
}
