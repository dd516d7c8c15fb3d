//! Donation FSM State Definitions
//!
//! Status IDs are designed for PostgreSQL storage as SMALLINT.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Donation lifecycle states
///
/// ```text
/// INITIATED ──▶ PENDING ──▶ SUCCEEDED ──▶ REFUNDED
///                   │
///                   └──────▶ FAILED
/// ```
///
/// Terminal states: SUCCEEDED (20), FAILED (-10), REFUNDED (30).
/// SUCCEEDED → REFUNDED is an administrative action outside this crate's
/// automated transitions; no operation here produces REFUNDED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum DonationStatus {
    /// Recorded locally, gateway not yet contacted
    Initiated = 0,

    /// Gateway accepted initialization - awaiting the webhook outcome
    Pending = 10,

    /// Terminal: gateway confirmed the charge
    Succeeded = 20,

    /// Terminal: gateway reported the charge failed
    Failed = -10,

    /// Terminal: succeeded, then administratively refunded
    Refunded = 30,
}

impl DonationStatus {
    /// Check if this is a terminal state (no automated transition leaves it)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DonationStatus::Succeeded | DonationStatus::Failed | DonationStatus::Refunded
        )
    }

    /// States a webhook settlement may be applied from.
    ///
    /// PENDING is the normal case; INITIATED is the race where the gateway
    /// confirmed before the initialize response was persisted. Both count
    /// as "not yet terminal" for settlement purposes.
    #[inline]
    pub fn is_settleable(&self) -> bool {
        matches!(self, DonationStatus::Initiated | DonationStatus::Pending)
    }

    /// Get the numeric status ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL status ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(DonationStatus::Initiated),
            10 => Some(DonationStatus::Pending),
            20 => Some(DonationStatus::Succeeded),
            -10 => Some(DonationStatus::Failed),
            30 => Some(DonationStatus::Refunded),
            _ => None,
        }
    }

    /// Get human-readable status name
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Initiated => "INITIATED",
            DonationStatus::Pending => "PENDING",
            DonationStatus::Succeeded => "SUCCEEDED",
            DonationStatus::Failed => "FAILED",
            DonationStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for DonationStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        DonationStatus::from_id(value).ok_or(())
    }
}
