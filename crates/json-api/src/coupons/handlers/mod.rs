//! Coupon Handlers

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod evaluate;
pub(crate) mod get;
pub(crate) mod index;
