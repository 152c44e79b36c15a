//! Redemption request and response bodies.

use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons_app::domain::{redemptions::data::NewRedemption, usages::records::UsageRecord};

use crate::coupons::models::{RequestedAsset, minor_units};

/// Redeem Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedeemCouponRequest {
    /// Client-chosen id; resending the same id never redeems twice
    pub uuid: Uuid,
    pub user_id: String,
    pub asset_type: Option<String>,
    pub asset_id: Option<String>,
    /// Order value checked against the coupon's bounds; defaults to `original_amount`
    pub order_value: Option<u64>,
    /// Discount granted, in minor units
    pub discount_amount: u64,
    /// Amount before discount, in minor units
    pub original_amount: u64,
}

impl TryFrom<RedeemCouponRequest> for NewRedemption {
    type Error = StatusError;

    fn try_from(request: RedeemCouponRequest) -> Result<Self, Self::Error> {
        if request.user_id.trim().is_empty() {
            return Err(StatusError::bad_request().brief("user_id is required"));
        }

        let asset = RequestedAsset::parse(request.asset_type, request.asset_id);

        Ok(Self {
            uuid: request.uuid.into(),
            user: request.user_id.into(),
            asset: asset.asset(),
            unrecognized_asset: asset.is_unrecognized(),
            order_value: request.order_value,
            discount_amount: minor_units(request.discount_amount, "discount_amount")?,
            original_amount: minor_units(request.original_amount, "original_amount")?,
        })
    }
}

/// Usage Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UsageResponse {
    pub uuid: Uuid,
    pub coupon_uuid: Uuid,
    pub user_id: String,
    /// One of `applied`, `refunded`, `cancelled`
    pub status: String,
    pub discount_amount: u64,
    pub original_amount: u64,
    pub applied_at: String,
    pub status_changed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UsageRecord> for UsageResponse {
    fn from(usage: UsageRecord) -> Self {
        Self {
            uuid: usage.uuid.into(),
            coupon_uuid: usage.coupon.into(),
            user_id: usage.user.into_string(),
            status: usage.status.to_string(),
            discount_amount: usage.discount_amount,
            original_amount: usage.original_amount,
            applied_at: usage.applied_at.to_string(),
            status_changed_at: usage.status_changed_at.map(|at| at.to_string()),
            created_at: usage.created_at.to_string(),
            updated_at: usage.updated_at.to_string(),
        }
    }
}

/// Usages Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UsagesResponse {
    /// Ledger entries, oldest first
    pub usages: Vec<UsageResponse>,
}
