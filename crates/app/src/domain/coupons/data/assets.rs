//! Asset References

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use thiserror::Error;

/// Kind of sellable inventory a coupon can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Activities,
    Events,
    Restaurants,
    Vehicles,
    Packages,
}

impl AssetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activities => "activities",
            Self::Events => "events",
            Self::Restaurants => "restaurants",
            Self::Vehicles => "vehicles",
            Self::Packages => "packages",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown asset type `{0}`")]
pub struct UnknownAssetKind(pub String);

impl FromStr for AssetKind {
    type Err = UnknownAssetKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "activities" => Ok(Self::Activities),
            "events" => Ok(Self::Events),
            "restaurants" => Ok(Self::Restaurants),
            "vehicles" => Ok(Self::Vehicles),
            "packages" => Ok(Self::Packages),
            other => Err(UnknownAssetKind(other.to_owned())),
        }
    }
}

/// A reference to one sellable item, owned by the external catalog.
///
/// Stored as an opaque `(asset_kind, asset_id)` pair; inside the engine the kind
/// travels with the identifier so the two can never be compared independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetRef {
    Activity(String),
    Event(String),
    Restaurant(String),
    Vehicle(String),
    Package(String),
}

impl AssetRef {
    #[must_use]
    pub fn new(kind: AssetKind, id: impl Into<String>) -> Self {
        let id = id.into();

        match kind {
            AssetKind::Activities => Self::Activity(id),
            AssetKind::Events => Self::Event(id),
            AssetKind::Restaurants => Self::Restaurant(id),
            AssetKind::Vehicles => Self::Vehicle(id),
            AssetKind::Packages => Self::Package(id),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        match self {
            Self::Activity(_) => AssetKind::Activities,
            Self::Event(_) => AssetKind::Events,
            Self::Restaurant(_) => AssetKind::Restaurants,
            Self::Vehicle(_) => AssetKind::Vehicles,
            Self::Package(_) => AssetKind::Packages,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Activity(id)
            | Self::Event(id)
            | Self::Restaurant(id)
            | Self::Vehicle(id)
            | Self::Package(id) => id,
        }
    }
}

impl Display for AssetRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.kind(), self.id())
    }
}
