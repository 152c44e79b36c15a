//! Coupon Usages Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    redemptions::{errors::into_status_error, models::UsagesResponse},
};

/// Coupon Usages Handler
///
/// Lists the coupon's ledger entries in every status, oldest first.
#[endpoint(tags("redemptions"), summary = "List Coupon Redemptions")]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<UsagesResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let usages = state
        .app
        .redemptions
        .list_usages(coupon.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(UsagesResponse {
        usages: usages.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use coupons_app::domain::{
        coupons::records::CouponUuid,
        redemptions::MockRedemptionsService,
        usages::{data::UsageStatus, records::UsageUuid},
    };

    use crate::test_helpers::{Mocks, make_usage, test_service};

    use super::*;

    #[tokio::test]
    async fn test_index_lists_every_status() -> TestResult {
        let coupon = CouponUuid::new();

        let mut redemptions = MockRedemptionsService::new();

        redemptions
            .expect_list_usages()
            .once()
            .withf(move |c| *c == coupon)
            .return_once(move |_| {
                Ok(vec![
                    make_usage(UsageUuid::new(), coupon, UsageStatus::Applied),
                    make_usage(UsageUuid::new(), coupon, UsageStatus::Refunded),
                    make_usage(UsageUuid::new(), coupon, UsageStatus::Cancelled),
                ])
            });

        let service = test_service(
            Mocks::with_redemptions(redemptions),
            Router::with_path("coupons/{coupon}/redemptions").get(handler),
        );

        let response: UsagesResponse =
            TestClient::get(format!("http://example.com/coupons/{coupon}/redemptions"))
                .send(&service)
                .await
                .take_json()
                .await?;

        let statuses: Vec<&str> = response.usages.iter().map(|u| u.status.as_str()).collect();

        assert_eq!(statuses, vec!["applied", "refunded", "cancelled"]);

        Ok(())
    }
}
