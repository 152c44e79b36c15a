//! Usage Ledger Data

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use thiserror::Error;

use crate::domain::{coupons::records::CouponUuid, usages::records::UsageUuid, users::UserId};

/// Lifecycle status of a ledger entry.
///
/// Entries are created `Applied` and may move once to `Refunded` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageStatus {
    Applied,
    Refunded,
    Cancelled,
}

impl UsageStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the entry counts towards per-user limits and customer history.
    #[must_use]
    pub const fn counts_towards_history(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl Display for UsageStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown usage status `{0}`")]
pub struct UnknownUsageStatus(pub String);

impl FromStr for UsageStatus {
    type Err = UnknownUsageStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "applied" => Ok(Self::Applied),
            "refunded" => Ok(Self::Refunded),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownUsageStatus(other.to_owned())),
        }
    }
}

/// New Usage Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUsage {
    pub uuid: UsageUuid,
    pub coupon: CouponUuid,
    pub user: UserId,
    pub discount_amount: u64,
    pub original_amount: u64,
    pub applied_at: Timestamp,
}

/// A coupon whose counter disagrees with its ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageDrift {
    pub coupon: CouponUuid,
    pub code: String,
    pub usage_count: u64,
    pub usage_limit: Option<u64>,
    pub ledger_count: u64,
}

impl UsageDrift {
    #[must_use]
    pub fn exceeds_usage_limit(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.usage_count > limit)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cancelled_entries_drop_out_of_history() -> TestResult {
        assert!("applied".parse::<UsageStatus>()?.counts_towards_history());
        assert!("refunded".parse::<UsageStatus>()?.counts_towards_history());
        assert!(!"cancelled".parse::<UsageStatus>()?.counts_towards_history());

        Ok(())
    }
}
