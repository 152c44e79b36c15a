//! Analytics service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsServiceError {
    #[error("coupon not found")]
    NotFound,

    #[error("invalid analytics scope")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for AnalyticsServiceError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            error => Self::Sql(error),
        }
    }
}
