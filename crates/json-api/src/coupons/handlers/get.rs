//! Get Coupon Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    coupons::{errors::into_status_error, models::CouponResponse},
    extensions::*,
};

/// Get Coupon Handler
///
/// Returns a live coupon.
#[endpoint(
    tags("coupons"),
    summary = "Get Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon found"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let coupon = state
        .app
        .coupons
        .get_coupon(coupon.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(coupon.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use coupons_app::domain::coupons::{CouponsServiceError, MockCouponsService, records::CouponUuid};

    use crate::test_helpers::{Mocks, make_coupon, test_service};

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        test_service(
            Mocks::with_coupons(coupons),
            Router::with_path("coupons/{coupon}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_returns_200() -> TestResult {
        let uuid = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_get_coupon()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |_| Ok(make_coupon(uuid)));

        let mut res = TestClient::get(format!("http://example.com/coupons/{uuid}"))
            .send(&make_service(coupons))
            .await;

        let response: CouponResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(response.uuid, uuid.into_uuid());
        assert_eq!(response.usage_count, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_coupon_returns_404() -> TestResult {
        let uuid = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_get_coupon()
            .once()
            .return_once(|_| Err(CouponsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/coupons/{uuid}"))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_invalid_uuid_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/coupons/123")
            .send(&make_service(MockCouponsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
