//! Coupon request and response bodies.

use std::string::ToString;

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons_app::domain::{
    coupons::{
        data::{
            ApplicableAsset, CouponKind, GlobalApplication, NewCoupon,
            assets::{AssetKind, AssetRef},
            discounts::SimpleDiscount,
        },
        records::CouponRecord,
    },
    eligibility::decision::{Decision, Reason},
};

use crate::extensions::*;

/// Discount granted by a coupon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum DiscountBody {
    /// Percentage of the order value, rounded down
    PercentageOff { percentage: u16 },

    /// Fixed amount in minor units
    AmountOff { amount: u64 },
}

impl From<DiscountBody> for SimpleDiscount {
    fn from(body: DiscountBody) -> Self {
        match body {
            DiscountBody::PercentageOff { percentage } => Self::PercentageOff { percentage },
            DiscountBody::AmountOff { amount } => Self::FixedAmountOff { amount },
        }
    }
}

impl From<SimpleDiscount> for DiscountBody {
    fn from(discount: SimpleDiscount) -> Self {
        match discount {
            SimpleDiscount::PercentageOff { percentage } => Self::PercentageOff { percentage },
            SimpleDiscount::FixedAmountOff { amount } => Self::AmountOff { amount },
        }
    }
}

/// Asset a coupon applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplicableAssetBody {
    /// One of `activities`, `events`, `restaurants`, `vehicles`, `packages`
    pub asset_type: String,
    pub asset_id: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

const fn active_by_default() -> bool {
    true
}

impl From<ApplicableAsset> for ApplicableAssetBody {
    fn from(asset: ApplicableAsset) -> Self {
        Self {
            asset_type: asset.asset.kind().to_string(),
            asset_id: asset.asset.id().to_string(),
            is_active: asset.is_active,
        }
    }
}

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCouponRequest {
    pub uuid: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// One of `public`, `private`, `first_purchase`, `returning_customer`
    pub coupon_type: String,
    pub discount: DiscountBody,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    /// RFC 3339 timestamp
    pub valid_from: String,
    /// RFC 3339 timestamp
    pub valid_until: String,
    pub usage_limit: Option<u64>,
    pub user_usage_limit: Option<u64>,
    pub minimum_order_value: Option<u64>,
    pub maximum_order_value: Option<u64>,
    #[serde(default)]
    pub allowed_users: Vec<String>,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub global_asset_types: Vec<String>,
    #[serde(default)]
    pub applicable_assets: Vec<ApplicableAssetBody>,
    pub partner_uuid: Option<Uuid>,
    pub organization_uuid: Option<Uuid>,
}

impl TryFrom<CreateCouponRequest> for NewCoupon {
    type Error = StatusError;

    fn try_from(request: CreateCouponRequest) -> Result<Self, Self::Error> {
        let global_application = GlobalApplication {
            is_global: request.is_global,
            asset_kinds: request
                .global_asset_types
                .iter()
                .map(|kind| parse_asset_kind(kind))
                .collect::<Result<_, _>>()?,
        };

        let applicable_assets = request
            .applicable_assets
            .into_iter()
            .map(|asset| {
                Ok(ApplicableAsset {
                    asset: AssetRef::new(parse_asset_kind(&asset.asset_type)?, asset.asset_id),
                    is_active: asset.is_active,
                })
            })
            .collect::<Result<Vec<_>, StatusError>>()?;

        Ok(Self {
            uuid: request.uuid.into(),
            code: request.code,
            name: request.name,
            description: request.description,
            kind: request
                .coupon_type
                .parse::<CouponKind>()
                .or_400("unknown coupon_type")?,
            discount: checked_discount(request.discount)?,
            is_active: request.is_active,
            valid_from: parse_timestamp(&request.valid_from, "valid_from")?,
            valid_until: parse_timestamp(&request.valid_until, "valid_until")?,
            usage_limit: optional_minor_units(request.usage_limit, "usage_limit")?,
            user_usage_limit: optional_minor_units(request.user_usage_limit, "user_usage_limit")?,
            minimum_order_value: optional_minor_units(
                request.minimum_order_value,
                "minimum_order_value",
            )?,
            maximum_order_value: optional_minor_units(
                request.maximum_order_value,
                "maximum_order_value",
            )?,
            allowed_users: request.allowed_users.into_iter().map(Into::into).collect(),
            global_application,
            applicable_assets,
            partner: request.partner_uuid,
            organization: request.organization_uuid,
        })
    }
}

/// Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    pub uuid: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub coupon_type: String,
    pub discount: DiscountBody,
    pub is_active: bool,
    pub valid_from: String,
    pub valid_until: String,
    pub usage_limit: Option<u64>,
    /// Redemptions currently holding capacity
    pub usage_count: u64,
    pub user_usage_limit: Option<u64>,
    pub minimum_order_value: Option<u64>,
    pub maximum_order_value: Option<u64>,
    pub allowed_users: Vec<String>,
    pub is_global: bool,
    pub global_asset_types: Vec<String>,
    pub applicable_assets: Vec<ApplicableAssetBody>,
    pub partner_uuid: Option<Uuid>,
    pub organization_uuid: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        Self {
            uuid: coupon.uuid.into(),
            code: coupon.code,
            name: coupon.name,
            description: coupon.description,
            coupon_type: coupon.kind.to_string(),
            discount: coupon.discount.into(),
            is_active: coupon.is_active,
            valid_from: coupon.valid_from.to_string(),
            valid_until: coupon.valid_until.to_string(),
            usage_limit: coupon.usage_limit,
            usage_count: coupon.usage_count,
            user_usage_limit: coupon.user_usage_limit,
            minimum_order_value: coupon.minimum_order_value,
            maximum_order_value: coupon.maximum_order_value,
            allowed_users: coupon
                .allowed_users
                .into_iter()
                .map(|user| user.into_string())
                .collect(),
            is_global: coupon.global_application.is_global,
            global_asset_types: coupon
                .global_application
                .asset_kinds
                .iter()
                .map(ToString::to_string)
                .collect(),
            applicable_assets: coupon
                .applicable_assets
                .into_iter()
                .map(Into::into)
                .collect(),
            partner_uuid: coupon.partner,
            organization_uuid: coupon.organization,
            created_at: coupon.created_at.to_string(),
            updated_at: coupon.updated_at.to_string(),
        }
    }
}

/// A failed eligibility rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReasonBody {
    /// Stable machine-readable code
    pub code: String,

    /// Customer-facing message (pt-BR)
    pub message: String,
}

impl From<&Reason> for ReasonBody {
    fn from(reason: &Reason) -> Self {
        Self {
            code: reason.code().to_string(),
            message: reason.to_string(),
        }
    }
}

/// Eligibility decision
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DecisionResponse {
    pub eligible: bool,

    /// Failed rules in evaluation order; empty when eligible
    pub reasons: Vec<ReasonBody>,
}

impl From<&Decision> for DecisionResponse {
    fn from(decision: &Decision) -> Self {
        Self {
            eligible: decision.is_eligible(),
            reasons: decision.reasons().iter().map(Into::into).collect(),
        }
    }
}

fn parse_asset_kind(kind: &str) -> Result<AssetKind, StatusError> {
    kind.parse::<AssetKind>().or_400("unknown asset_type")
}

/// Asset named by an evaluation or redemption request.
///
/// Anything that does not resolve to an [`AssetRef`] still reaches the evaluator,
/// where it fails applicability instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestedAsset {
    Absent,
    Known(AssetRef),
    Unrecognized,
}

impl RequestedAsset {
    pub(crate) fn parse(asset_type: Option<String>, asset_id: Option<String>) -> Self {
        match (asset_type, asset_id) {
            (None, None) => Self::Absent,
            (Some(kind), Some(id)) => kind
                .parse::<AssetKind>()
                .map_or(Self::Unrecognized, |kind| Self::Known(AssetRef::new(kind, id))),
            _ => Self::Unrecognized,
        }
    }

    pub(crate) fn asset(&self) -> Option<AssetRef> {
        match self {
            Self::Known(asset) => Some(asset.clone()),
            Self::Absent | Self::Unrecognized => None,
        }
    }

    pub(crate) const fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized)
    }
}

/// Amounts are stored as signed 64-bit minor units.
pub(crate) fn minor_units(amount: u64, field: &str) -> Result<u64, StatusError> {
    i64::try_from(amount)
        .map(|_| amount)
        .or_400(&format!("\"{field}\" is out of range"))
}

fn optional_minor_units(amount: Option<u64>, field: &str) -> Result<Option<u64>, StatusError> {
    amount.map(|amount| minor_units(amount, field)).transpose()
}

fn checked_discount(body: DiscountBody) -> Result<SimpleDiscount, StatusError> {
    if let DiscountBody::AmountOff { amount } = body {
        minor_units(amount, "discount.amount")?;
    }

    Ok(body.into())
}

fn parse_timestamp(value: &str, field: &str) -> Result<Timestamp, StatusError> {
    value
        .parse::<Timestamp>()
        .or_400(&format!("could not parse \"{field}\""))
}
