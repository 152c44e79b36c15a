//! Tenant Analytics Handler

use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use coupons_app::domain::analytics::data::AnalyticsScope;

use crate::{
    analytics::{errors::into_status_error, models::ScopeAnalyticsResponse},
    extensions::*,
};

/// Tenant Analytics Handler
///
/// Aggregates live coupons of a partner and/or organization. `from` and `until`
/// bound the redemption instant; both are inclusive.
#[endpoint(
    tags("analytics"),
    summary = "Tenant Analytics",
    responses(
        (status_code = StatusCode::OK, description = "Tenant metrics"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    partner_uuid: QueryParam<Uuid, false>,
    organization_uuid: QueryParam<Uuid, false>,
    from: QueryParam<String, false>,
    until: QueryParam<String, false>,
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<ScopeAnalyticsResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let scope = AnalyticsScope {
        partner: partner_uuid.into_inner(),
        organization: organization_uuid.into_inner(),
        from: from.into_timestamp("from")?,
        until: until.into_timestamp("until")?,
    };

    let analytics = state
        .app
        .analytics
        .scope_analytics(scope, at.into_instant_or_now("at")?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(analytics.into()))
}
