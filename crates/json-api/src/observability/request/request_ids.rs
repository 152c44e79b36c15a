//! Request ids: echoed from `x-request-id` when usable, otherwise minted.

use std::fmt::{Display, Formatter, Result as FmtResult};

use salvo::{Request, prelude::Response};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id we are willing to log and echo.
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestId(String);

impl RequestId {
    pub(super) fn from_request(req: &Request) -> Self {
        Self::from_header(req.header::<String>(REQUEST_ID_HEADER))
    }

    fn from_header(value: Option<String>) -> Self {
        value
            .map(|value| value.trim().to_owned())
            .filter(|value| is_usable(value))
            .map_or_else(|| Self(Uuid::now_v7().to_string()), Self)
    }

    pub(super) fn as_str(&self) -> &str {
        &self.0
    }

    pub(super) fn write_to(&self, res: &mut Response) {
        if let Err(source) = res.add_header(REQUEST_ID_HEADER, self.as_str(), true) {
            warn!(request_id = %self, "could not echo request id: {source}");
        }
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

fn is_usable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|byte| byte.is_ascii_graphic())
}
