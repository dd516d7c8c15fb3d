//! Recipient Entity Types
//!
//! Profile data is freely editable; the received totals are a derived
//! aggregate only the store's crediting operations may touch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::RecipientError;
use crate::core_types::{ActorId, RecipientId};
use crate::money::{Amount, Currency};

pub const MAX_FULL_NAME: usize = 100;
pub const MAX_BIO: usize = 1000;
pub const MAX_NEED_DESCRIPTION: usize = 500;

/// Verification workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum VerificationStatus {
    Pending = 0,
    Verified = 1,
    Rejected = -1,
}

impl VerificationStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(VerificationStatus::Pending),
            1 => Some(VerificationStatus::Verified),
            -1 => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a recipient needs support with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NeedCategory {
    Education,
    Healthcare,
    Food,
    Housing,
    Clothing,
    Other,
}

/// Urgency of a need
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NeedPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for NeedPriority {
    fn default() -> Self {
        NeedPriority::Medium
    }
}

/// One stated need on a recipient's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Need {
    pub category: NeedCategory,
    pub description: String,
    /// Target amount; zero is allowed (need stated, cost unknown yet)
    pub amount_needed: Decimal,
    #[serde(default)]
    pub priority: NeedPriority,
}

/// Profile photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Editable recipient profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientProfile {
    pub full_name: String,
    pub bio: String,
    #[serde(default)]
    pub needs: Vec<Need>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub location: Location,
}

impl RecipientProfile {
    pub fn new(full_name: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            bio: bio.into(),
            needs: Vec::new(),
            photos: Vec::new(),
            location: Location::default(),
        }
    }

    pub fn with_need(mut self, need: Need) -> Self {
        self.needs.push(need);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Field-level validation shared by register and profile edits
    pub fn validate(&self) -> Result<(), RecipientError> {
        if self.full_name.trim().is_empty() {
            return Err(RecipientError::BlankName);
        }
        if self.full_name.len() > MAX_FULL_NAME {
            return Err(RecipientError::FieldTooLong {
                field: "full_name",
                max: MAX_FULL_NAME,
            });
        }
        if self.bio.trim().is_empty() {
            return Err(RecipientError::BlankBio);
        }
        if self.bio.len() > MAX_BIO {
            return Err(RecipientError::FieldTooLong {
                field: "bio",
                max: MAX_BIO,
            });
        }
        for need in &self.needs {
            if need.description.trim().is_empty() {
                return Err(RecipientError::BlankNeedDescription);
            }
            if need.description.len() > MAX_NEED_DESCRIPTION {
                return Err(RecipientError::FieldTooLong {
                    field: "need.description",
                    max: MAX_NEED_DESCRIPTION,
                });
            }
            if need.amount_needed.is_sign_negative() {
                return Err(RecipientError::NegativeAmountNeeded);
            }
        }
        Ok(())
    }
}

/// Received totals per currency
///
/// Kept per currency so the reconciliation invariant (totals equal the sum
/// of succeeded direct donations plus allocations) holds exactly even on a
/// mixed-currency ledger. Missing entries read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyTotals(BTreeMap<Currency, Decimal>);

impl CurrencyTotals {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Rebuild totals from stored (currency, amount) rows
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Currency, Decimal)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// Total received in one currency (zero if never credited)
    pub fn get(&self, currency: Currency) -> Decimal {
        self.0.get(&currency).copied().unwrap_or_default()
    }

    /// Apply a credit; totals only ever grow
    pub fn credit(&mut self, currency: Currency, amount: Amount) {
        let entry = self.0.entry(currency).or_default();
        *entry += amount.value();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        self.0.iter().map(|(c, d)| (*c, *d))
    }
}

/// An individual or group eligible to receive funds
///
/// Never deleted - deactivation hides a recipient from public listings
/// while the ledger history stays intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub profile: RecipientProfile,
    pub verification: VerificationStatus,
    pub active: bool,
    pub total_received: CurrencyTotals,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipient {
    /// Validate and build a new, unverified, active recipient
    pub fn new(profile: RecipientProfile, created_by: ActorId) -> Result<Self, RecipientError> {
        if created_by.is_nil() {
            return Err(RecipientError::MissingActor);
        }
        profile.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: RecipientId::new(),
            profile,
            verification: VerificationStatus::Pending,
            active: true,
            total_received: CurrencyTotals::new(),
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}
