//! Redemption Handlers

pub(crate) mod cancel;
pub(crate) mod create;
pub(crate) mod index;
pub(crate) mod refund;
