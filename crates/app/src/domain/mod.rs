//! Coupon Domain Concerns

pub mod analytics;
pub mod coupons;
pub mod eligibility;
pub mod redemptions;
pub mod usages;
pub mod users;
