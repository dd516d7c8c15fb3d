//! Allocation Types
//!
//! An allocation moves already-collected funds to a recipient. It is an
//! append-only ledger entry: corrections are made with a compensating
//! entry, never by editing history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::{ActorId, AllocationId, DonationId, RecipientId};
use crate::money::{Amount, Currency};

pub const MAX_ALLOCATION_NOTES: usize = 1000;

/// Where allocated funds come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum AllocationSource {
    /// Drawn from the shared pool; subject to the pool balance check
    Pool = 1,
    /// Out-of-band correction; bypasses the pool balance check
    Adjustment = 2,
}

impl AllocationSource {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(AllocationSource::Pool),
            2 => Some(AllocationSource::Adjustment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationSource::Pool => "POOL",
            AllocationSource::Adjustment => "ADJUSTMENT",
        }
    }

    /// Only pool-sourced allocations draw the balance down
    pub fn draws_from_pool(&self) -> bool {
        matches!(self, AllocationSource::Pool)
    }
}

impl fmt::Display for AllocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inbound allocation parameters, validated by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub source: AllocationSource,
    pub recipient_id: RecipientId,
    pub amount: Amount,
    #[serde(default)]
    pub currency: Currency,
    pub performed_by: ActorId,
    /// Donations this allocation earmarks, for audit trails only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub donation_ids: Vec<DonationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AllocationRequest {
    pub fn pool(recipient_id: RecipientId, amount: Amount, performed_by: ActorId) -> Self {
        Self {
            source: AllocationSource::Pool,
            recipient_id,
            amount,
            currency: Currency::default(),
            performed_by,
            donation_ids: Vec::new(),
            notes: None,
        }
    }

    pub fn adjustment(recipient_id: RecipientId, amount: Amount, performed_by: ActorId) -> Self {
        Self {
            source: AllocationSource::Adjustment,
            ..Self::pool(recipient_id, amount, performed_by)
        }
    }

    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_donation_ids(mut self, ids: Vec<DonationId>) -> Self {
        self.donation_ids = ids;
        self
    }
}

/// A recorded allocation ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub source: AllocationSource,
    pub recipient_id: RecipientId,
    pub amount: Amount,
    pub currency: Currency,
    pub performed_by: ActorId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub donation_ids: Vec<DonationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Allocation {
    /// Stamp a validated request into a ledger entry
    pub fn from_request(request: AllocationRequest) -> Self {
        Self {
            id: AllocationId::new(),
            source: request.source,
            recipient_id: request.recipient_id,
            amount: request.amount,
            currency: request.currency,
            performed_by: request.performed_by,
            donation_ids: request.donation_ids,
            notes: request.notes,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocation[{} {} {} {} -> {}]",
            self.id, self.source, self.amount, self.currency, self.recipient_id
        )
    }
}

/// Optional narrowing for allocation listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<RecipientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AllocationSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl AllocationFilter {
    pub fn for_recipient(recipient_id: RecipientId) -> Self {
        Self {
            recipient_id: Some(recipient_id),
            ..Self::default()
        }
    }

    pub fn from_source(source: AllocationSource) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, allocation: &Allocation) -> bool {
        if let Some(recipient_id) = self.recipient_id {
            if allocation.recipient_id != recipient_id {
                return false;
            }
        }
        if let Some(source) = self.source {
            if allocation.source != source {
                return false;
            }
        }
        true
    }
}

/// Allocation entry with display names resolved for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationView {
    #[serde(flatten)]
    pub allocation: Allocation,
    pub recipient_name: Option<String>,
    pub performed_by_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_roundtrip() {
        for source in [AllocationSource::Pool, AllocationSource::Adjustment] {
            assert_eq!(AllocationSource::from_id(source.id()), Some(source));
        }
        assert_eq!(AllocationSource::from_id(0), None);
        assert_eq!(AllocationSource::from_id(3), None);
    }

    #[test]
    fn test_pool_draw_flag() {
        assert!(AllocationSource::Pool.draws_from_pool());
        assert!(!AllocationSource::Adjustment.draws_from_pool());
    }

    #[test]
    fn test_request_builders() {
        let recipient = RecipientId::new();
        let actor = ActorId::new();
        let request = AllocationRequest::pool(recipient, Amount::parse("2500").unwrap(), actor)
            .in_currency(Currency::NGN)
            .with_notes("School fees for term two");

        assert_eq!(request.source, AllocationSource::Pool);
        assert_eq!(request.currency, Currency::NGN);
        assert!(request.donation_ids.is_empty());

        let adj = AllocationRequest::adjustment(recipient, Amount::parse("100").unwrap(), actor);
        assert_eq!(adj.source, AllocationSource::Adjustment);
        assert_eq!(adj.currency, Currency::KES);
    }

    #[test]
    fn test_from_request_stamps_identity() {
        let request = AllocationRequest::pool(
            RecipientId::new(),
            Amount::parse("300").unwrap(),
            ActorId::new(),
        );
        let a = Allocation::from_request(request.clone());
        let b = Allocation::from_request(request);
        assert_ne!(a.id, b.id);
        assert_eq!(a.amount, b.amount);
    }

    #[test]
    fn test_filter_matching() {
        let recipient = RecipientId::new();
        let entry = Allocation::from_request(AllocationRequest::pool(
            recipient,
            Amount::parse("50").unwrap(),
            ActorId::new(),
        ));

        assert!(AllocationFilter::default().matches(&entry));
        assert!(AllocationFilter::for_recipient(recipient).matches(&entry));
        assert!(!AllocationFilter::for_recipient(RecipientId::new()).matches(&entry));
        assert!(AllocationFilter::from_source(AllocationSource::Pool).matches(&entry));
        assert!(!AllocationFilter::from_source(AllocationSource::Adjustment).matches(&entry));
    }
}
