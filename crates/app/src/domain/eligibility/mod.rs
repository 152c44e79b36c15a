//! Eligibility

pub mod data;
pub mod decision;
pub mod errors;
pub mod rules;
pub mod service;

pub use errors::EligibilityServiceError;
pub use service::*;
