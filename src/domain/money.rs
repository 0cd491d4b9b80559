use crate::error::MarketplaceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Largest value representable with 10 digits and 2 decimal places.
pub const MAX_AMOUNT: Decimal = dec!(99999999.99);

/// Represents a positive monetary amount, such as a budget, a bid or a payment.
///
/// Amounts carry at most 2 decimal places and never exceed [`MAX_AMOUNT`].
/// Equality is numeric, so `150` and `150.00` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, MarketplaceError> {
        if value <= Decimal::ZERO {
            return Err(MarketplaceError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        if value.normalize().scale() > 2 {
            return Err(MarketplaceError::ValidationError(
                "Amount must have at most 2 decimal places".to_string(),
            ));
        }
        if value > MAX_AMOUNT {
            return Err(MarketplaceError::ValidationError(format!(
                "Amount must not exceed {MAX_AMOUNT}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MarketplaceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Accumulated funds, e.g. a worker's wallet. May be zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
