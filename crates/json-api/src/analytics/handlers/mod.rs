//! Analytics Handlers

pub(crate) mod coupon;
pub(crate) mod scope;
