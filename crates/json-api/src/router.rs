//! App Router

use salvo::Router;

use crate::{analytics, coupons, redemptions};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("coupons")
                .get(coupons::index::handler)
                .post(coupons::create::handler)
                .push(Router::with_path("evaluate").post(coupons::evaluate::handler))
                .push(
                    Router::with_path("{coupon}")
                        .get(coupons::get::handler)
                        .delete(coupons::delete::handler)
                        .push(
                            Router::with_path("redemptions")
                                .get(redemptions::index::handler)
                                .post(redemptions::create::handler),
                        )
                        .push(Router::with_path("analytics").get(analytics::coupon::handler)),
                ),
        )
        .push(
            Router::with_path("redemptions/{usage}")
                .push(Router::with_path("refund").post(redemptions::refund::handler))
                .push(Router::with_path("cancel").post(redemptions::cancel::handler)),
        )
        .push(Router::with_path("analytics").get(analytics::scope::handler))
}
