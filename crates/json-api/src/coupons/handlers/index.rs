//! Coupon Index Handler

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons_app::domain::coupons::data::CouponFilter;

use crate::{
    coupons::{errors::into_status_error, models::CouponResponse},
    extensions::*,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponsResponse {
    /// Live coupons, oldest first
    pub coupons: Vec<CouponResponse>,
}

/// Coupon Index Handler
///
/// Lists live coupons, optionally narrowed to a partner or organization.
#[endpoint(tags("coupons"), summary = "List Coupons")]
pub(crate) async fn handler(
    partner_uuid: QueryParam<Uuid, false>,
    organization_uuid: QueryParam<Uuid, false>,
    depot: &mut Depot,
) -> Result<Json<CouponsResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let coupons = state
        .app
        .coupons
        .list_coupons(CouponFilter {
            partner: partner_uuid.into_inner(),
            organization: organization_uuid.into_inner(),
        })
        .await
        .map_err(into_status_error)?;

    Ok(Json(CouponsResponse {
        coupons: coupons.into_iter().map(Into::into).collect(),
    }))
}
