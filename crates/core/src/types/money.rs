//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are USD throughout the demo (the storefront formats them the way
//! the display layer hardcodes USD), so `Money` carries only a decimal
//! amount. All aggregate math (line totals, subtotals) stays exact - no
//! floating point drift across repeated cart mutations.

use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A USD amount backed by [`rust_decimal::Decimal`].
///
/// Serializes transparently as the decimal amount, so persisted carts and
/// order exports carry exact values such as `"12.50"`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Render with exactly two decimal places and no currency symbol
    /// (e.g., `12.50`), the form schema.org offers expect.
    #[must_use]
    pub fn to_fixed(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl core::fmt::Display for Money {
    /// Localized currency display, e.g. `$12.50`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
