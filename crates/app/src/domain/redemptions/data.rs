//! Redemptions Data

use crate::domain::{
    coupons::data::assets::AssetRef,
    eligibility::{data::EligibilityContext, decision::Decision},
    usages::records::{UsageRecord, UsageUuid},
    users::UserId,
};

/// New Redemption Data
///
/// `uuid` is chosen by the caller so a retried checkout maps onto the same ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedemption {
    pub uuid: UsageUuid,
    pub user: UserId,
    pub asset: Option<AssetRef>,
    pub unrecognized_asset: bool,
    pub order_value: Option<u64>,
    pub discount_amount: u64,
    pub original_amount: u64,
}

impl NewRedemption {
    /// Context the coupon is re-evaluated against. The order value defaults to the
    /// pre-discount amount.
    #[must_use]
    pub fn context(&self) -> EligibilityContext {
        EligibilityContext {
            user: Some(self.user.clone()),
            asset: self.asset.clone(),
            unrecognized_asset: self.unrecognized_asset,
            order_value: Some(self.order_value.unwrap_or(self.original_amount)),
        }
    }
}

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    /// Capacity consumed and ledger entry written.
    Applied(UsageRecord),

    /// Nothing written; the decision explains why.
    Rejected(Decision),
}
