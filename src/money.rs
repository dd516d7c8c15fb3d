//! Money Types
//!
//! Currency and amount handling for the donation ledger. All donation and
//! allocation amounts go through [`Amount`]; raw `Decimal` only appears in
//! derived aggregates (pool balance, received totals) which may be zero.
//!
//! ## Design Principles
//! 1. Explicit Error Handling: no silent truncation, no silent sign flips
//! 2. Entry amounts are strictly positive with at most two fractional digits
//! 3. The gateway wire uses minor units (x100); conversion lives here only
//!
//! ## Usage
//! ```rust
//! use harambee::money::{Amount, Currency};
//!
//! let amount = Amount::parse("499.99").unwrap();
//! assert_eq!(amount.minor_units(Currency::KES).unwrap(), 49_999);
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum fractional digits an entry amount may carry.
///
/// Every supported currency subdivides into hundredths (cents / kobo /
/// pesewas), so two digits is both the display and the storage bound.
pub const FRACTION_LIMIT: u32 = 2;

// ============================================================================
// Error Types
// ============================================================================

/// Money validation and conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

// ============================================================================
// Currency
// ============================================================================

/// Supported settlement currencies
///
/// The set a deployment actually accepts is narrowed further by
/// configuration; this enum is the closed universe the ledger can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    KES,
    NGN,
    GHS,
    ZAR,
    USD,
}

impl Currency {
    /// Every currency the ledger can represent
    pub const ALL: [Currency; 5] = [
        Currency::KES,
        Currency::NGN,
        Currency::GHS,
        Currency::ZAR,
        Currency::USD,
    ];

    /// ISO 4217 code
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::KES => "KES",
            Currency::NGN => "NGN",
            Currency::GHS => "GHS",
            Currency::ZAR => "ZAR",
            Currency::USD => "USD",
        }
    }

    /// Minor units per major unit (the gateway wire wants kobo/cents)
    pub const fn subunit(&self) -> i64 {
        100
    }

    /// Parse an ISO code, case-sensitive
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KES" => Some(Currency::KES),
            "NGN" => Some(Currency::NGN),
            "GHS" => Some(Currency::GHS),
            "ZAR" => Some(Currency::ZAR),
            "USD" => Some(Currency::USD),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::KES
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| MoneyError::UnsupportedCurrency(s.to_string()))
    }
}

// ============================================================================
// Amount
// ============================================================================

/// A strictly positive decimal currency amount, at most two fractional digits
///
/// Construction validates; serde deserialization routes through the same
/// validation via `try_from`, so a negative or over-precise amount cannot
/// enter through a wire payload either.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Validate a decimal into an entry amount
    ///
    /// # Errors
    /// * `InvalidAmount` - zero or negative
    /// * `PrecisionOverflow` - more than [`FRACTION_LIMIT`] fractional digits
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value.is_sign_negative() || value.is_zero() {
            return Err(MoneyError::InvalidAmount);
        }
        // Strict: "1.230" is rejected rather than silently rescaled
        if value.scale() > FRACTION_LIMIT {
            return Err(MoneyError::PrecisionOverflow {
                provided: value.scale(),
                max: FRACTION_LIMIT,
            });
        }
        Ok(Amount(value))
    }

    /// Parse a client-provided amount string (e.g., "500", "499.99")
    ///
    /// Explicit signs, scientific notation, and group separators are all
    /// rejected; the accepted grammar is plain `digits[.digits]`.
    pub fn parse(amount_str: &str) -> Result<Self, MoneyError> {
        let amount_str = amount_str.trim();
        if amount_str.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }
        if amount_str.starts_with('-') || amount_str.starts_with('+') {
            return Err(MoneyError::InvalidAmount);
        }
        let value = Decimal::from_str(amount_str)
            .map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;
        Self::new(value)
    }

    /// The underlying decimal value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Checked addition (sum of two positive amounts stays positive)
    pub fn checked_add(&self, other: Amount) -> Result<Amount, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(MoneyError::Overflow)
    }

    /// Convert to gateway minor units (x100)
    ///
    /// Exact by construction: with at most two fractional digits the scaled
    /// value has no remainder, so the only failure mode is overflow.
    pub fn minor_units(&self, currency: Currency) -> Result<i64, MoneyError> {
        let scaled = self
            .0
            .checked_mul(Decimal::from(currency.subunit()))
            .ok_or(MoneyError::Overflow)?;
        scaled.to_i64().ok_or(MoneyError::Overflow)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.prec$}", self.0, prec = FRACTION_LIMIT as usize)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
