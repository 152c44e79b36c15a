//! Extension traits

mod depot;
mod instant;
mod result;

pub(crate) use depot::DepotExt as _;
pub(crate) use instant::InstantParamExt as _;
pub(crate) use result::ResultExt as _;
