//! Coupon eligibility, redemption accounting and analytics.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

pub mod uuids;
