//! Usage Ledger
//!
//! One entry per committed redemption. Only the redemption accountant writes here;
//! everything else reads.

pub mod data;
pub mod records;
pub(crate) mod repository;
