//! Price value object for catalog entries and quote totals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

use super::ValidationError;

/// Non-negative money amount in the lab's billing currency.
///
/// Stored as integer cents so cart totals never accumulate floating
/// point error; the catalog documents carry decimal values and are
/// converted on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Creates a price from integer cents.
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a price from a decimal amount as found in catalog documents.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is negative or not finite.
    pub fn from_decimal(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::invalid_format(
                "price",
                format!("amount must be a non-negative number, got {}", amount),
            ));
        }
        Ok(Self((amount * 100.0).round() as u64))
    }

    /// Returns the amount in integer cents.
    pub fn as_cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount as a decimal value.
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero amount.
    pub fn zero() -> Self {
        Self(0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
