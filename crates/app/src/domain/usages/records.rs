//! Usage Ledger Records

use jiff::Timestamp;

use crate::{
    domain::{coupons::records::CouponUuid, usages::data::UsageStatus, users::UserId},
    uuids::TypedUuid,
};

/// Usage UUID
pub type UsageUuid = TypedUuid<UsageRecord>;

/// Usage Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub uuid: UsageUuid,
    pub coupon: CouponUuid,
    pub user: UserId,
    pub status: UsageStatus,
    pub discount_amount: u64,
    pub original_amount: u64,
    pub applied_at: Timestamp,
    pub status_changed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
