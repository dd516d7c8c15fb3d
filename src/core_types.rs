//! Ledger Identity Types
//!
//! ULID-backed identifiers for every ledger entity, plus the gateway
//! reference string that links a donation to its external payment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Donation identifier
///
/// Using ULID provides:
/// - Monotonic, sortable IDs
/// - No coordination needed (no machine_id)
/// - 128-bit with good entropy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonationId(ulid::Ulid);

impl DonationId {
    /// Generate a new unique DonationId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the inner ULID value
    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for DonationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DonationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DonationId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Recipient identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(ulid::Ulid);

impl RecipientId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for RecipientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipientId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Allocation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationId(ulid::Ulid);

impl AllocationId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for AllocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AllocationId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Donor account identifier
///
/// Optional on donations - anonymous giving is allowed, in which case the
/// donation carries only the metadata contact details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonorId(ulid::Ulid);

impl DonorId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for DonorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DonorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DonorId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Actor identity (administrator / staff member performing a write)
///
/// Authentication happens outside this crate; callers thread the
/// authenticated identity through. A nil actor is never accepted for
/// privileged operations - writes fail closed instead of falling back
/// to a default identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(ulid::Ulid);

impl ActorId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }

    /// The all-zero actor, only useful as a sentinel in tests
    pub fn nil() -> Self {
        Self(ulid::Ulid::nil())
    }

    /// Check for the all-zero identity (rejected by privileged writes)
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Gateway reference - the key the external payment processor echoes back
///
/// Assigned once at donation creation (`donation_<uuid>`), unique across
/// all donations, and the only key a webhook event carries that can
/// resolve the donation it settles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayReference(String);

impl GatewayReference {
    /// Generate a fresh reference for a new donation
    pub fn generate() -> Self {
        Self(format!("donation_{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GatewayReference {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GatewayReference {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for GatewayReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donation_id_roundtrip() {
        let id = DonationId::new();
        let parsed: DonationId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = DonationId::new();
        let b = DonationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_id_string() {
        assert!("not-a-ulid".parse::<DonationId>().is_err());
        assert!("".parse::<RecipientId>().is_err());
    }

    #[test]
    fn test_nil_actor() {
        assert!(ActorId::nil().is_nil());
        assert!(!ActorId::new().is_nil());
    }

    #[test]
    fn test_gateway_reference_format() {
        let r = GatewayReference::generate();
        assert!(r.as_str().starts_with("donation_"));
        // uuid v4 hyphenated form after the prefix
        assert_eq!(r.as_str().len(), "donation_".len() + 36);

        let other = GatewayReference::generate();
        assert_ne!(r, other);
    }

    #[test]
    fn test_gateway_reference_from_str() {
        let r = GatewayReference::from("donation_abc123");
        assert_eq!(r.as_str(), "donation_abc123");
        assert_eq!(r.to_string(), "donation_abc123");
    }
}
