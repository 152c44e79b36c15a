//! Timestamp query parameter parsing.

use jiff::Timestamp;
use salvo::{oapi::extract::QueryParam, prelude::StatusError};

use crate::extensions::*;

pub(crate) trait InstantParamExt {
    /// Parse an optional RFC 3339 parameter, reporting `name` on failure.
    fn into_timestamp(self, name: &str) -> Result<Option<Timestamp>, StatusError>;

    /// Parse the evaluation instant, defaulting to now.
    fn into_instant_or_now(self, name: &str) -> Result<Timestamp, StatusError>
    where
        Self: Sized,
    {
        Ok(self.into_timestamp(name)?.unwrap_or_else(Timestamp::now))
    }
}

impl InstantParamExt for QueryParam<String, false> {
    fn into_timestamp(self, name: &str) -> Result<Option<Timestamp>, StatusError> {
        self.into_inner()
            .map(|value| value.parse::<Timestamp>())
            .transpose()
            .or_400(&format!("could not parse \"{name}\" query parameter"))
    }
}
