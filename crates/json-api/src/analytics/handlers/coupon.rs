//! Coupon Analytics Handler

use salvo::{
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    analytics::{errors::into_status_error, models::SnapshotResponse},
    extensions::*,
};

/// Coupon Analytics Handler
#[endpoint(
    tags("analytics"),
    summary = "Coupon Analytics",
    responses(
        (status_code = StatusCode::OK, description = "Coupon metrics"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<SnapshotResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let at = at.into_instant_or_now("at")?;

    let snapshot = state
        .app
        .analytics
        .coupon_analytics(coupon.into_inner().into(), at)
        .await
        .map_err(into_status_error)?;

    Ok(Json(snapshot.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use coupons_app::domain::{
        analytics::{AnalyticsServiceError, MockAnalyticsService, data::UsageTotals},
        coupons::records::CouponUuid,
    };

    use crate::test_helpers::{Mocks, test_service};

    use super::*;

    fn make_service(analytics: MockAnalyticsService) -> Service {
        test_service(
            Mocks::with_analytics(analytics),
            Router::with_path("coupons/{coupon}/analytics").get(handler),
        )
    }

    #[tokio::test]
    async fn test_coupon_analytics_reports_snapshot() -> TestResult {
        let coupon = CouponUuid::new();
        let at: Timestamp = "2026-03-01T00:00:00Z".parse()?;

        let snapshot = UsageTotals {
            total_usages: 4,
            total_refunds: 1,
            total_discount_given: 100,
            total_order_value: 800,
            recent_usages: 2,
        }
        .snapshot(Some(8));

        let mut analytics = MockAnalyticsService::new();

        analytics
            .expect_coupon_analytics()
            .once()
            .withf(move |c, when| *c == coupon && *when == at)
            .return_once(move |_, _| Ok(snapshot));

        let response: SnapshotResponse = TestClient::get(format!(
            "http://example.com/coupons/{coupon}/analytics?at=2026-03-01T00:00:00Z"
        ))
        .send(&make_service(analytics))
        .await
        .take_json()
        .await?;

        assert_eq!(response.total_usages, 4);
        assert_eq!(response.average_discount_amount, 25);
        assert_eq!(response.average_order_value, 200);
        assert_eq!(response.usage_rate, Some(0.5));

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_analytics_unknown_coupon_returns_404() -> TestResult {
        let coupon = CouponUuid::new();

        let mut analytics = MockAnalyticsService::new();

        analytics
            .expect_coupon_analytics()
            .once()
            .return_once(|_, _| Err(AnalyticsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/coupons/{coupon}/analytics"))
            .send(&make_service(analytics))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_analytics_bad_instant_returns_400() -> TestResult {
        let coupon = CouponUuid::new();

        let mut analytics = MockAnalyticsService::new();

        analytics.expect_coupon_analytics().never();

        let res = TestClient::get(format!(
            "http://example.com/coupons/{coupon}/analytics?at=yesterday"
        ))
        .send(&make_service(analytics))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
