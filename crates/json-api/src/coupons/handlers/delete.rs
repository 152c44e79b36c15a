//! Delete Coupon Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{coupons::errors::into_status_error, extensions::*};

/// Delete Coupon Handler
///
/// Soft deletes the coupon; its code becomes available again.
#[endpoint(
    tags("coupons"),
    summary = "Delete Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.delete",
    skip(coupon, depot),
    fields(coupon_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.state_or_500()?;
    let coupon = coupon.into_inner();

    tracing::Span::current().record("coupon_uuid", tracing::field::display(coupon));

    state
        .app
        .coupons
        .delete_coupon(coupon.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(coupon_uuid = %coupon, "deleted coupon");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use coupons_app::domain::coupons::{CouponsServiceError, MockCouponsService, records::CouponUuid};

    use crate::test_helpers::{Mocks, test_service};

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        test_service(
            Mocks::with_coupons(coupons),
            Router::with_path("coupons/{coupon}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_delete_coupon_success() -> TestResult {
        let uuid = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_delete_coupon()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(|_| Ok(()));

        let res = TestClient::delete(format!("http://example.com/coupons/{uuid}"))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_coupon_not_found_returns_404() -> TestResult {
        let uuid = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_delete_coupon()
            .once()
            .return_once(|_| Err(CouponsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/coupons/{uuid}"))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
