//! Allocation Service
//!
//! Moves already-collected funds to recipients. Validation happens here;
//! the check-then-append against the pool balance happens inside the store,
//! serialized per currency, so a passing validation can still come back as
//! insufficient funds and nothing will have been written.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::error::AllocationError;
use super::types::{
    Allocation, AllocationFilter, AllocationRequest, AllocationView, MAX_ALLOCATION_NOTES,
};
use crate::config::LimitsConfig;
use crate::core_types::ActorId;
use crate::money::Currency;
use crate::store::{AllocationOutcome, LedgerStore};

#[derive(Debug, Clone)]
pub struct AllocationService {
    store: Arc<dyn LedgerStore>,
    limits: LimitsConfig,
}

impl AllocationService {
    pub fn new(store: Arc<dyn LedgerStore>, limits: LimitsConfig) -> Self {
        Self { store, limits }
    }

    /// Validate and record an allocation, crediting the recipient in the
    /// same atomic unit. Pool-sourced allocations are additionally checked
    /// against the derived pool balance for their currency.
    pub async fn allocate(
        &self,
        request: AllocationRequest,
    ) -> Result<Allocation, AllocationError> {
        if request.performed_by.is_nil() {
            return Err(AllocationError::MissingActor);
        }
        if let Some(notes) = &request.notes {
            if notes.len() > MAX_ALLOCATION_NOTES {
                return Err(AllocationError::NotesTooLong {
                    max: MAX_ALLOCATION_NOTES,
                });
            }
        }
        if !self.limits.currency_enabled(request.currency) {
            return Err(AllocationError::CurrencyNotEnabled(request.currency));
        }
        if request.amount.value() < self.limits.min_allocation {
            return Err(AllocationError::AmountBelowMinimum {
                amount: request.amount,
                minimum: self.limits.min_allocation,
            });
        }
        if self.store.recipient(request.recipient_id).await?.is_none() {
            return Err(AllocationError::RecipientNotFound(request.recipient_id));
        }

        let allocation = Allocation::from_request(request);
        let pool_check = allocation.source.draws_from_pool();
        match self.store.record_allocation(&allocation, pool_check).await? {
            AllocationOutcome::Recorded => {
                info!(
                    allocation_id = %allocation.id,
                    source = %allocation.source,
                    recipient_id = %allocation.recipient_id,
                    amount = %allocation.amount,
                    currency = %allocation.currency,
                    performed_by = %allocation.performed_by,
                    "Allocation recorded"
                );
                Ok(allocation)
            }
            AllocationOutcome::InsufficientPool { available } => {
                warn!(
                    recipient_id = %allocation.recipient_id,
                    currency = %allocation.currency,
                    requested = %allocation.amount,
                    available = %available,
                    "Pool balance cannot cover allocation"
                );
                Err(AllocationError::InsufficientFunds {
                    requested: allocation.amount,
                    available,
                })
            }
        }
    }

    /// Allocation history, newest first, with display names resolved
    pub async fn list(
        &self,
        filter: &AllocationFilter,
    ) -> Result<Vec<AllocationView>, AllocationError> {
        let entries = self.store.list_allocations(filter).await?;

        let mut recipient_names: HashMap<_, Option<String>> = HashMap::new();
        let mut actor_names: HashMap<_, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(entries.len());
        for allocation in entries {
            let recipient_name = match recipient_names.get(&allocation.recipient_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .store
                        .recipient(allocation.recipient_id)
                        .await?
                        .map(|r| r.profile.full_name);
                    recipient_names.insert(allocation.recipient_id, name.clone());
                    name
                }
            };
            let performed_by_name = match actor_names.get(&allocation.performed_by) {
                Some(name) => name.clone(),
                None => {
                    let name = self.store.actor_name(allocation.performed_by).await?;
                    actor_names.insert(allocation.performed_by, name.clone());
                    name
                }
            };
            views.push(AllocationView {
                allocation,
                recipient_name,
                performed_by_name,
            });
        }
        Ok(views)
    }

    /// Derived pool balance for one currency
    pub async fn pool_balance(&self, currency: Currency) -> Result<Decimal, AllocationError> {
        Ok(self.store.pool_balance(currency).await?)
    }

    /// Record an actor's display name for listing projections
    pub async fn register_actor(&self, id: ActorId, name: &str) -> Result<(), AllocationError> {
        if id.is_nil() {
            return Err(AllocationError::MissingActor);
        }
        if name.trim().is_empty() {
            return Err(AllocationError::BlankActorName);
        }
        self.store.put_actor(id, name).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::AllocationSource;
    use crate::core_types::RecipientId;
    use crate::donation::{Donation, DonationRequest, DonationStatus};
    use crate::money::Amount;
    use crate::recipient::{Recipient, RecipientProfile};
    use crate::store::MemoryLedger;

    struct Harness {
        service: AllocationService,
        store: Arc<MemoryLedger>,
        recipient: Recipient,
        admin: ActorId,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryLedger::new());
        let recipient = Recipient::new(
            RecipientProfile::new("Esther Moraa", "Saving toward a sewing machine"),
            ActorId::new(),
        )
        .unwrap();
        store.insert_recipient(&recipient).await.unwrap();
        Harness {
            service: AllocationService::new(store.clone(), LimitsConfig::default()),
            store,
            recipient,
            admin: ActorId::new(),
        }
    }

    /// Insert a pool donation and settle it, leaving funds in the pool
    async fn fund_pool(store: &MemoryLedger, amount: &str) {
        let donation = Donation::from_request(
            DonationRequest::pool(
                Amount::parse(amount).unwrap(),
                Currency::KES,
                "donor@example.org",
            ),
            &LimitsConfig::default(),
        )
        .unwrap();
        store.insert_donation(&donation).await.unwrap();
        store
            .settle_donation(donation.id, DonationStatus::Succeeded, None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pool_allocation_credits_recipient() {
        let h = harness().await;
        fund_pool(&h.store, "5000").await;

        let allocation = h
            .service
            .allocate(AllocationRequest::pool(
                h.recipient.id,
                Amount::parse("1200").unwrap(),
                h.admin,
            ))
            .await
            .unwrap();
        assert_eq!(allocation.source, AllocationSource::Pool);

        let credited = h.store.recipient(h.recipient.id).await.unwrap().unwrap();
        assert_eq!(
            credited.total_received.get(Currency::KES),
            Decimal::from(1200)
        );
        assert_eq!(
            h.service.pool_balance(Currency::KES).await.unwrap(),
            Decimal::from(3800)
        );
    }

    #[tokio::test]
    async fn test_insufficient_pool_rejected_without_write() {
        let h = harness().await;
        fund_pool(&h.store, "1000").await;

        let err = h
            .service
            .allocate(AllocationRequest::pool(
                h.recipient.id,
                Amount::parse("1500").unwrap(),
                h.admin,
            ))
            .await
            .unwrap_err();
        match err {
            AllocationError::InsufficientFunds {
                requested,
                available,
            } => {
                assert_eq!(requested, Amount::parse("1500").unwrap());
                assert_eq!(available, Decimal::from(1000));
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }

        // nothing written: totals untouched, pool intact
        let untouched = h.store.recipient(h.recipient.id).await.unwrap().unwrap();
        assert!(untouched.total_received.is_empty());
        assert_eq!(
            h.service.pool_balance(Currency::KES).await.unwrap(),
            Decimal::from(1000)
        );
    }

    #[tokio::test]
    async fn test_adjustment_bypasses_pool_check() {
        let h = harness().await;
        // empty pool; an adjustment still goes through
        let allocation = h
            .service
            .allocate(
                AllocationRequest::adjustment(
                    h.recipient.id,
                    Amount::parse("250").unwrap(),
                    h.admin,
                )
                .with_notes("Compensating entry for gateway shortfall"),
            )
            .await
            .unwrap();
        assert_eq!(allocation.source, AllocationSource::Adjustment);

        // adjustments never drive the pool negative
        assert_eq!(
            h.service.pool_balance(Currency::KES).await.unwrap(),
            Decimal::ZERO
        );
        let credited = h.store.recipient(h.recipient.id).await.unwrap().unwrap();
        assert_eq!(
            credited.total_received.get(Currency::KES),
            Decimal::from(250)
        );
    }

    #[tokio::test]
    async fn test_fail_closed_without_actor() {
        let h = harness().await;
        fund_pool(&h.store, "5000").await;

        let err = h
            .service
            .allocate(AllocationRequest::pool(
                h.recipient.id,
                Amount::parse("500").unwrap(),
                ActorId::nil(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::MissingActor));
    }

    #[tokio::test]
    async fn test_validation_rejections() {
        let h = harness().await;
        fund_pool(&h.store, "5000").await;

        // below the configured minimum
        assert!(matches!(
            h.service
                .allocate(AllocationRequest::pool(
                    h.recipient.id,
                    Amount::parse("99.99").unwrap(),
                    h.admin,
                ))
                .await,
            Err(AllocationError::AmountBelowMinimum { .. })
        ));

        // unknown recipient
        assert!(matches!(
            h.service
                .allocate(AllocationRequest::pool(
                    RecipientId::new(),
                    Amount::parse("500").unwrap(),
                    h.admin,
                ))
                .await,
            Err(AllocationError::RecipientNotFound(_))
        ));

        // oversized notes
        assert!(matches!(
            h.service
                .allocate(
                    AllocationRequest::pool(
                        h.recipient.id,
                        Amount::parse("500").unwrap(),
                        h.admin,
                    )
                    .with_notes("x".repeat(MAX_ALLOCATION_NOTES + 1)),
                )
                .await,
            Err(AllocationError::NotesTooLong { .. })
        ));

        // disabled currency
        let narrowed = AllocationService::new(
            h.store.clone(),
            LimitsConfig {
                currencies: vec![Currency::KES],
                ..LimitsConfig::default()
            },
        );
        assert!(matches!(
            narrowed
                .allocate(
                    AllocationRequest::pool(
                        h.recipient.id,
                        Amount::parse("500").unwrap(),
                        h.admin,
                    )
                    .in_currency(Currency::USD),
                )
                .await,
            Err(AllocationError::CurrencyNotEnabled(Currency::USD))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_draws_cannot_overspend() {
        let h = harness().await;
        fund_pool(&h.store, "500").await;

        let first = h.service.allocate(AllocationRequest::pool(
            h.recipient.id,
            Amount::parse("300").unwrap(),
            h.admin,
        ));
        let second = h.service.allocate(AllocationRequest::pool(
            h.recipient.id,
            Amount::parse("300").unwrap(),
            h.admin,
        ));
        let (a, b) = tokio::join!(first, second);

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one draw may win");
        let balance = h.service.pool_balance(Currency::KES).await.unwrap();
        assert_eq!(balance, Decimal::from(200));
        assert!(balance >= Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_list_resolves_display_names() {
        let h = harness().await;
        fund_pool(&h.store, "5000").await;
        h.service
            .register_actor(h.admin, "Grace Njeri")
            .await
            .unwrap();

        h.service
            .allocate(AllocationRequest::pool(
                h.recipient.id,
                Amount::parse("700").unwrap(),
                h.admin,
            ))
            .await
            .unwrap();
        // performed by an actor with no directory entry
        h.service
            .allocate(AllocationRequest::adjustment(
                h.recipient.id,
                Amount::parse("150").unwrap(),
                ActorId::new(),
            ))
            .await
            .unwrap();

        let views = h.service.list(&AllocationFilter::default()).await.unwrap();
        assert_eq!(views.len(), 2);
        // newest first: the adjustment came last
        assert_eq!(views[0].allocation.source, AllocationSource::Adjustment);
        assert_eq!(views[0].performed_by_name, None);
        assert_eq!(
            views[0].recipient_name.as_deref(),
            Some("Esther Moraa")
        );
        assert_eq!(views[1].performed_by_name.as_deref(), Some("Grace Njeri"));

        let pool_only = h
            .service
            .list(&AllocationFilter::from_source(AllocationSource::Pool))
            .await
            .unwrap();
        assert_eq!(pool_only.len(), 1);
    }

    #[tokio::test]
    async fn test_register_actor_validation() {
        let h = harness().await;
        assert!(matches!(
            h.service.register_actor(ActorId::nil(), "Grace").await,
            Err(AllocationError::MissingActor)
        ));
        assert!(matches!(
            h.service.register_actor(ActorId::new(), "   ").await,
            Err(AllocationError::BlankActorName)
        ));
    }
}
