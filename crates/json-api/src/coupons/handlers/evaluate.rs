//! Evaluate Coupon Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, QueryParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons_app::domain::eligibility::data::{CouponLookup, EligibilityContext};

use crate::{
    coupons::{
        errors::eligibility_status_error,
        models::{ReasonBody, RequestedAsset},
    },
    extensions::*,
};

/// Evaluate Coupon Request
///
/// Identify the coupon by exactly one of `coupon_uuid` or `code`.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct EvaluateCouponRequest {
    pub coupon_uuid: Option<Uuid>,
    pub code: Option<String>,
    pub user_id: Option<String>,
    pub asset_type: Option<String>,
    pub asset_id: Option<String>,
    /// Order value in minor units
    pub order_value: Option<u64>,
}

impl EvaluateCouponRequest {
    fn lookup(&mut self) -> Result<CouponLookup, StatusError> {
        match (self.coupon_uuid, self.code.take()) {
            (Some(uuid), None) => Ok(CouponLookup::Uuid(uuid.into())),
            (None, Some(code)) => Ok(CouponLookup::Code(code)),
            _ => Err(StatusError::bad_request().brief("provide either coupon_uuid or code")),
        }
    }
}

/// Evaluate Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct EvaluationResponse {
    /// Resolved coupon, absent when nothing matched
    pub coupon_uuid: Option<Uuid>,
    pub eligible: bool,
    pub reasons: Vec<ReasonBody>,
    /// Discount in minor units, when eligible and an order value was given
    pub discount: Option<u64>,
}

/// Evaluate Coupon Handler
///
/// Read-only: a rejected coupon still answers 200 with its reasons.
#[endpoint(
    tags("coupons"),
    summary = "Evaluate Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Eligibility decision"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<EvaluateCouponRequest>,
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<EvaluationResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let at = at.into_instant_or_now("at")?;

    let mut request = json.into_inner();
    let lookup = request.lookup()?;

    let asset = RequestedAsset::parse(request.asset_type, request.asset_id);

    let context = EligibilityContext {
        user: request.user_id.map(Into::into),
        asset: asset.asset(),
        unrecognized_asset: asset.is_unrecognized(),
        order_value: request.order_value,
    };

    let evaluation = state
        .app
        .eligibility
        .evaluate(lookup, context, at)
        .await
        .map_err(eligibility_status_error)?;

    Ok(Json(EvaluationResponse {
        coupon_uuid: evaluation.coupon.map(Into::into),
        eligible: evaluation.decision.is_eligible(),
        reasons: evaluation.decision.reasons().iter().map(Into::into).collect(),
        discount: evaluation.discount,
    }))
}
