//! In-Memory Ledger
//!
//! One `RwLock` guards the whole ledger state, so every trait operation is
//! a single critical section and the atomicity the trait promises holds
//! trivially. Suits tests and single-process deployments; durable setups
//! use [`PgLedger`](super::PgLedger).

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{
    AllocationOutcome, CreditInstruction, LedgerStore, MarkPendingOutcome, SettleOutcome,
    StoreError,
};
use crate::allocation::{Allocation, AllocationFilter};
use crate::core_types::{ActorId, DonationId, GatewayReference, RecipientId};
use crate::donation::{Donation, DonationKind, DonationStatus};
use crate::money::Currency;
use crate::recipient::{Recipient, RecipientProfile, VerificationStatus};

#[derive(Debug, Default)]
struct LedgerState {
    donations: HashMap<DonationId, Donation>,
    by_reference: HashMap<String, DonationId>,
    recipients: HashMap<RecipientId, Recipient>,
    allocations: Vec<Allocation>,
    actors: HashMap<ActorId, String>,
}

impl LedgerState {
    /// Succeeded pool donations minus pool-sourced allocations, one currency
    fn derived_pool(&self, currency: Currency) -> Decimal {
        let collected: Decimal = self
            .donations
            .values()
            .filter(|d| {
                d.kind == DonationKind::Pool
                    && d.status == DonationStatus::Succeeded
                    && d.currency == currency
            })
            .map(|d| d.amount.value())
            .sum();
        let allocated: Decimal = self
            .allocations
            .iter()
            .filter(|a| a.source.draws_from_pool() && a.currency == currency)
            .map(|a| a.amount.value())
            .sum();
        collected - allocated
    }
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Corrupt("ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Corrupt("ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn insert_donation(&self, donation: &Donation) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let reference = donation.gateway_reference.as_str().to_string();
        if state.by_reference.contains_key(&reference) {
            return Err(StoreError::DuplicateReference(
                donation.gateway_reference.clone(),
            ));
        }
        state.by_reference.insert(reference, donation.id);
        state.donations.insert(donation.id, donation.clone());
        Ok(())
    }

    async fn donation(&self, id: DonationId) -> Result<Option<Donation>, StoreError> {
        Ok(self.read()?.donations.get(&id).cloned())
    }

    async fn donation_by_reference(
        &self,
        reference: &GatewayReference,
    ) -> Result<Option<Donation>, StoreError> {
        let state = self.read()?;
        Ok(state
            .by_reference
            .get(reference.as_str())
            .and_then(|id| state.donations.get(id))
            .cloned())
    }

    async fn mark_pending(&self, id: DonationId) -> Result<MarkPendingOutcome, StoreError> {
        let mut state = self.write()?;
        let donation = state
            .donations
            .get_mut(&id)
            .ok_or(StoreError::DonationMissing(id))?;
        if donation.status == DonationStatus::Initiated {
            donation.status = DonationStatus::Pending;
            donation.updated_at = Utc::now();
            Ok(MarkPendingOutcome::Marked(donation.clone()))
        } else {
            Ok(MarkPendingOutcome::Raced(donation.clone()))
        }
    }

    async fn settle_donation(
        &self,
        id: DonationId,
        status: DonationStatus,
        gateway_trx_id: Option<String>,
        credit: Option<CreditInstruction>,
    ) -> Result<SettleOutcome, StoreError> {
        let mut state = self.write()?;

        let current = state
            .donations
            .get(&id)
            .ok_or(StoreError::DonationMissing(id))?;
        if !current.status.is_settleable() {
            return Ok(SettleOutcome::AlreadyTerminal(current.clone()));
        }
        // Check the credit target before touching anything, so a bad credit
        // leaves the donation untouched too
        if let Some(credit) = &credit {
            if !state.recipients.contains_key(&credit.recipient_id) {
                return Err(StoreError::RecipientMissing(credit.recipient_id));
            }
        }

        let now = Utc::now();
        let donation = state
            .donations
            .get_mut(&id)
            .ok_or(StoreError::DonationMissing(id))?;
        donation.status = status;
        if gateway_trx_id.is_some() {
            donation.gateway_trx_id = gateway_trx_id;
        }
        donation.updated_at = now;
        let settled = donation.clone();

        if let Some(credit) = credit {
            let recipient = state
                .recipients
                .get_mut(&credit.recipient_id)
                .ok_or(StoreError::RecipientMissing(credit.recipient_id))?;
            recipient.total_received.credit(credit.currency, credit.amount);
            recipient.updated_at = now;
        }

        Ok(SettleOutcome::Applied(settled))
    }

    async fn insert_recipient(&self, recipient: &Recipient) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.recipients.insert(recipient.id, recipient.clone());
        Ok(())
    }

    async fn recipient(&self, id: RecipientId) -> Result<Option<Recipient>, StoreError> {
        Ok(self.read()?.recipients.get(&id).cloned())
    }

    async fn list_recipients(&self, only_active: bool) -> Result<Vec<Recipient>, StoreError> {
        let state = self.read()?;
        let mut recipients: Vec<Recipient> = state
            .recipients
            .values()
            .filter(|r| !only_active || r.active)
            .cloned()
            .collect();
        recipients.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.id.inner().cmp(&b.id.inner()))
        });
        Ok(recipients)
    }

    async fn update_recipient_profile(
        &self,
        id: RecipientId,
        profile: RecipientProfile,
    ) -> Result<Option<Recipient>, StoreError> {
        let mut state = self.write()?;
        Ok(state.recipients.get_mut(&id).map(|recipient| {
            recipient.profile = profile;
            recipient.updated_at = Utc::now();
            recipient.clone()
        }))
    }

    async fn set_recipient_verification(
        &self,
        id: RecipientId,
        status: VerificationStatus,
    ) -> Result<Option<Recipient>, StoreError> {
        let mut state = self.write()?;
        Ok(state.recipients.get_mut(&id).map(|recipient| {
            recipient.verification = status;
            recipient.updated_at = Utc::now();
            recipient.clone()
        }))
    }

    async fn set_recipient_active(
        &self,
        id: RecipientId,
        active: bool,
    ) -> Result<Option<Recipient>, StoreError> {
        let mut state = self.write()?;
        Ok(state.recipients.get_mut(&id).map(|recipient| {
            recipient.active = active;
            recipient.updated_at = Utc::now();
            recipient.clone()
        }))
    }

    async fn record_allocation(
        &self,
        allocation: &Allocation,
        pool_check: bool,
    ) -> Result<AllocationOutcome, StoreError> {
        let mut state = self.write()?;

        if !state.recipients.contains_key(&allocation.recipient_id) {
            return Err(StoreError::RecipientMissing(allocation.recipient_id));
        }
        if pool_check {
            let available = state.derived_pool(allocation.currency);
            if available < allocation.amount.value() {
                return Ok(AllocationOutcome::InsufficientPool { available });
            }
        }

        state.allocations.push(allocation.clone());
        let recipient = state
            .recipients
            .get_mut(&allocation.recipient_id)
            .ok_or(StoreError::RecipientMissing(allocation.recipient_id))?;
        recipient
            .total_received
            .credit(allocation.currency, allocation.amount);
        recipient.updated_at = Utc::now();

        Ok(AllocationOutcome::Recorded)
    }

    async fn list_allocations(
        &self,
        filter: &AllocationFilter,
    ) -> Result<Vec<Allocation>, StoreError> {
        let state = self.read()?;
        let mut entries: Vec<Allocation> = state
            .allocations
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.inner().cmp(&a.id.inner()))
        });
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn pool_balance(&self, currency: Currency) -> Result<Decimal, StoreError> {
        Ok(self.read()?.derived_pool(currency))
    }

    async fn put_actor(&self, id: ActorId, name: &str) -> Result<(), StoreError> {
        self.write()?.actors.insert(id, name.to_string());
        Ok(())
    }

    async fn actor_name(&self, id: ActorId) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.actors.get(&id).cloned())
    }
}
