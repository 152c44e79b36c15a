//! Create Coupon Handler

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use coupons_app::domain::coupons::data::NewCoupon;

use crate::{
    coupons::{
        errors::into_status_error,
        models::{CouponResponse, CreateCouponRequest},
    },
    extensions::*,
};

/// Create Coupon Handler
///
/// The code is stored trimmed and uppercased.
#[endpoint(
    tags("coupons"),
    summary = "Create Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::CONFLICT, description = "Coupon code already in use"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let coupon = NewCoupon::try_from(json.into_inner())?;

    let coupon = state
        .app
        .coupons
        .create_coupon(coupon)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/coupons/{}", coupon.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(coupon.into()))
}
