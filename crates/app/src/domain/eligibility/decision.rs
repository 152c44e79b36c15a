//! Eligibility Decisions

use std::fmt::{Display, Formatter, Result as FmtResult};

use rusty_money::{Money, iso};

/// A single failed eligibility rule.
///
/// `code` is stable for clients; the `Display` form is the customer-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    NotFound,
    Inactive,
    NotYetValid,
    Expired,
    UsageLimitReached,
    BelowMinimumOrderValue { minimum: u64 },
    AboveMaximumOrderValue { maximum: u64 },
    NotApplicable,
    UserUsageLimitReached,
    UserNotAllowed,
    FirstPurchaseOnly,
    ReturningCustomersOnly,
}

impl Reason {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Inactive => "inactive",
            Self::NotYetValid => "not_yet_valid",
            Self::Expired => "expired",
            Self::UsageLimitReached => "usage_limit_reached",
            Self::BelowMinimumOrderValue { .. } => "below_minimum_order_value",
            Self::AboveMaximumOrderValue { .. } => "above_maximum_order_value",
            Self::NotApplicable => "not_applicable",
            Self::UserUsageLimitReached => "user_usage_limit_reached",
            Self::UserNotAllowed => "user_not_allowed",
            Self::FirstPurchaseOnly => "first_purchase_only",
            Self::ReturningCustomersOnly => "returning_customers_only",
        }
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NotFound => f.write_str("Cupom não encontrado"),
            Self::Inactive => f.write_str("Cupom inativo"),
            Self::NotYetValid => f.write_str("Cupom ainda não está válido"),
            Self::Expired => f.write_str("Cupom expirado"),
            Self::UsageLimitReached => f.write_str("Limite de uso atingido"),
            Self::BelowMinimumOrderValue { minimum } => {
                write!(f, "Valor mínimo do pedido: {}", format_amount(*minimum))
            }
            Self::AboveMaximumOrderValue { maximum } => {
                write!(f, "Valor máximo do pedido: {}", format_amount(*maximum))
            }
            Self::NotApplicable => f.write_str("Cupom não aplicável a este item"),
            Self::UserUsageLimitReached => f.write_str("Limite de uso por usuário atingido"),
            Self::UserNotAllowed => f.write_str("Usuário não autorizado a usar este cupom"),
            Self::FirstPurchaseOnly => f.write_str("Cupom válido apenas para primeira compra"),
            Self::ReturningCustomersOnly => {
                f.write_str("Cupom válido apenas para clientes recorrentes")
            }
        }
    }
}

/// Render minor units as BRL, falling back to the raw number past `i64::MAX`.
fn format_amount(minor: u64) -> String {
    i64::try_from(minor).map_or_else(
        |_| minor.to_string(),
        |minor| Money::from_minor(minor, iso::BRL).to_string(),
    )
}

/// Outcome of evaluating a coupon. Eligible iff no rule failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    reasons: Vec<Reason>,
}

impl Decision {
    #[must_use]
    pub fn eligible() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self {
            reasons: vec![Reason::NotFound],
        }
    }

    #[must_use]
    pub fn from_reasons(reasons: Vec<Reason>) -> Self {
        Self { reasons }
    }

    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Whether the coupon could not be resolved at all, as opposed to failing a rule.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.reasons.as_slice(), [Reason::NotFound])
    }

    /// Failed rules in evaluation order.
    #[must_use]
    pub fn reasons(&self) -> &[Reason] {
        &self.reasons
    }

    /// Customer-facing messages in evaluation order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}
