//! Ledger Store
//!
//! Every multi-record step that must be all-or-nothing lives behind this
//! trait, so the services above it never have to sequence partial writes:
//!
//! - settling a donation and crediting the recipient is one unit
//! - recording an allocation and crediting the recipient is one unit
//! - the pool balance check and the allocation append are serialized per
//!   currency, so concurrent allocations cannot jointly overdraw the pool
//!
//! Settlement and the INITIATED→PENDING transition are compare-and-swap
//! operations: the store reports a lost race by handing back the donation
//! as it already stands, and the caller decides what that means.

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt::Debug;
use thiserror::Error;

use crate::allocation::{Allocation, AllocationFilter};
use crate::core_types::{ActorId, DonationId, GatewayReference, RecipientId};
use crate::donation::{Donation, DonationStatus};
use crate::money::{Amount, Currency};
use crate::recipient::{Recipient, RecipientProfile, VerificationStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Gateway reference already recorded: {0}")]
    DuplicateReference(GatewayReference),

    #[error("Donation not in store: {0}")]
    DonationMissing(DonationId),

    #[error("Recipient not in store: {0}")]
    RecipientMissing(RecipientId),

    #[error("Ledger state corrupt: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result of the INITIATED→PENDING compare-and-swap
#[derive(Debug, Clone)]
pub enum MarkPendingOutcome {
    /// This caller performed the transition
    Marked(Donation),
    /// Someone else moved the donation first; here is where it stands now
    Raced(Donation),
}

/// Result of the settlement compare-and-swap
#[derive(Debug, Clone)]
pub enum SettleOutcome {
    /// The donation was settleable and is now in the requested terminal state
    Applied(Donation),
    /// The donation was already terminal; nothing was written
    AlreadyTerminal(Donation),
}

/// Result of recording an allocation
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationOutcome {
    Recorded,
    /// Rejected by the pool check; nothing was written
    InsufficientPool { available: Decimal },
}

/// Recipient credit to apply atomically with a settlement
#[derive(Debug, Clone, PartialEq)]
pub struct CreditInstruction {
    pub recipient_id: RecipientId,
    pub currency: Currency,
    pub amount: Amount,
}

#[async_trait]
pub trait LedgerStore: Send + Sync + Debug {
    // === Donations ===

    /// Persist a freshly created donation. The gateway reference must be
    /// unique across the whole ledger.
    async fn insert_donation(&self, donation: &Donation) -> Result<(), StoreError>;

    async fn donation(&self, id: DonationId) -> Result<Option<Donation>, StoreError>;

    async fn donation_by_reference(
        &self,
        reference: &GatewayReference,
    ) -> Result<Option<Donation>, StoreError>;

    /// Compare-and-swap INITIATED→PENDING.
    async fn mark_pending(&self, id: DonationId) -> Result<MarkPendingOutcome, StoreError>;

    /// Compare-and-swap any settleable status to the given terminal status,
    /// recording the gateway transaction id and applying the credit (if any)
    /// in the same atomic unit.
    async fn settle_donation(
        &self,
        id: DonationId,
        status: DonationStatus,
        gateway_trx_id: Option<String>,
        credit: Option<CreditInstruction>,
    ) -> Result<SettleOutcome, StoreError>;

    // === Recipients ===

    async fn insert_recipient(&self, recipient: &Recipient) -> Result<(), StoreError>;

    async fn recipient(&self, id: RecipientId) -> Result<Option<Recipient>, StoreError>;

    async fn list_recipients(&self, only_active: bool) -> Result<Vec<Recipient>, StoreError>;

    /// Replace the editable profile. `None` when the recipient is unknown.
    async fn update_recipient_profile(
        &self,
        id: RecipientId,
        profile: RecipientProfile,
    ) -> Result<Option<Recipient>, StoreError>;

    async fn set_recipient_verification(
        &self,
        id: RecipientId,
        status: VerificationStatus,
    ) -> Result<Option<Recipient>, StoreError>;

    async fn set_recipient_active(
        &self,
        id: RecipientId,
        active: bool,
    ) -> Result<Option<Recipient>, StoreError>;

    // === Allocations ===

    /// Append an allocation and credit its recipient as one unit. With
    /// `pool_check` set, first derive the pool balance for the allocation's
    /// currency and reject instead of overdrawing; the check and the append
    /// are serialized per currency.
    async fn record_allocation(
        &self,
        allocation: &Allocation,
        pool_check: bool,
    ) -> Result<AllocationOutcome, StoreError>;

    async fn list_allocations(
        &self,
        filter: &AllocationFilter,
    ) -> Result<Vec<Allocation>, StoreError>;

    /// Derived pool balance for one currency: succeeded pool donations
    /// minus pool-sourced allocations.
    async fn pool_balance(&self, currency: Currency) -> Result<Decimal, StoreError>;

    // === Actors ===

    async fn put_actor(&self, id: ActorId, name: &str) -> Result<(), StoreError>;

    async fn actor_name(&self, id: ActorId) -> Result<Option<String>, StoreError>;
}
