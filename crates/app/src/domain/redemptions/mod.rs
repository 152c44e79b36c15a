//! Redemptions

pub mod data;
pub mod errors;
pub mod service;

pub use errors::RedemptionsServiceError;
pub use service::*;
