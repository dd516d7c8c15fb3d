//! Donation Lifecycle Manager
//!
//! Drives a donation from creation through gateway settlement. The manager
//! never trusts delivery order or delivery count: webhooks may arrive
//! before the payment session is recorded, twice, or for references it has
//! never seen, and every case lands in a defined state.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::DonationError;
use super::state::DonationStatus;
use super::types::{
    Donation, DonationKind, DonationRequest, EventDisposition, EventOutcome, GatewayEvent,
    PaymentSession,
};
use crate::config::LimitsConfig;
use crate::core_types::{DonationId, GatewayReference};
use crate::gateway::{PaymentGateway, PaymentInit};
use crate::store::{CreditInstruction, LedgerStore, MarkPendingOutcome, SettleOutcome, StoreError};

#[derive(Debug, Clone)]
pub struct DonationLifecycle {
    store: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
    limits: LimitsConfig,
}

impl DonationLifecycle {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        gateway: Arc<dyn PaymentGateway>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            limits,
        }
    }

    /// Validate and persist a new INITIATED donation.
    ///
    /// The gateway reference is generated here, before any gateway call, so
    /// a webhook can resolve the donation no matter how early it arrives.
    pub async fn create(&self, request: DonationRequest) -> Result<Donation, DonationError> {
        let donation = Donation::from_request(request, &self.limits)?;
        self.store.insert_donation(&donation).await?;
        info!(
            donation_id = %donation.id,
            kind = %donation.kind,
            amount = %donation.amount,
            currency = %donation.currency,
            reference = %donation.gateway_reference,
            "Donation created"
        );
        Ok(donation)
    }

    /// Open a payment session at the gateway and move INITIATED→PENDING.
    ///
    /// On any gateway failure the donation stays INITIATED and the error is
    /// surfaced; the caller decides whether to retry. If a webhook settles
    /// the donation while the gateway call is in flight, the settlement
    /// wins and the session is still returned; the redirect is moot, not
    /// an error.
    pub async fn begin_payment(&self, id: DonationId) -> Result<PaymentSession, DonationError> {
        let donation = self
            .store
            .donation(id)
            .await?
            .ok_or(DonationError::NotFound(id))?;
        if donation.status != DonationStatus::Initiated {
            return Err(DonationError::AlreadyBegun {
                donation_id: id,
                status: donation.status,
            });
        }

        let init = PaymentInit {
            reference: donation.gateway_reference.clone(),
            donor_email: donation.metadata.donor_email.clone(),
            amount: donation.amount,
            currency: donation.currency,
            donation_id: donation.id,
            kind: donation.kind,
        };
        let session = match self.gateway.initialize(&init).await {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    donation_id = %id,
                    error = %e,
                    retryable = e.retryable(),
                    "Gateway initialize failed; donation remains INITIATED"
                );
                return Err(e.into());
            }
        };

        match self.store.mark_pending(id).await? {
            MarkPendingOutcome::Marked(pending) => {
                info!(
                    donation_id = %id,
                    reference = %session.reference,
                    "Donation pending at gateway"
                );
                Ok(PaymentSession {
                    donation_id: pending.id,
                    redirect_url: session.redirect_url,
                    gateway_reference: session.reference,
                })
            }
            MarkPendingOutcome::Raced(current) if current.status.is_terminal() => {
                warn!(
                    donation_id = %id,
                    status = %current.status,
                    "Donation settled before the payment session was recorded"
                );
                Ok(PaymentSession {
                    donation_id: current.id,
                    redirect_url: session.redirect_url,
                    gateway_reference: session.reference,
                })
            }
            MarkPendingOutcome::Raced(current) => Err(DonationError::AlreadyBegun {
                donation_id: id,
                status: current.status,
            }),
        }
    }

    /// Apply one gateway settlement event, idempotently.
    ///
    /// - unknown reference: error, never creates a donation
    /// - terminal + matching outcome: duplicate delivery, no-op
    /// - terminal + different outcome: conflict, nothing overwritten
    /// - settleable: transition, record the transaction id, and for a
    ///   succeeded direct donation credit the recipient in the same unit
    pub async fn apply_gateway_event(
        &self,
        event: GatewayEvent,
    ) -> Result<EventDisposition, DonationError> {
        let donation = match self.store.donation_by_reference(&event.reference).await? {
            Some(donation) => donation,
            None => {
                warn!(
                    reference = %event.reference,
                    event_type = %event.event_type,
                    "Webhook references no known donation"
                );
                return Err(DonationError::UnresolvedReference(event.reference));
            }
        };

        if donation.status.is_terminal() {
            return self.classify_terminal(donation, &event);
        }

        let credit = self.credit_for(&donation, event.outcome)?;
        let outcome = self
            .store
            .settle_donation(
                donation.id,
                event.outcome.target_status(),
                Some(event.gateway_trx_id.clone()),
                credit,
            )
            .await?;

        match outcome {
            SettleOutcome::Applied(settled) => {
                match settled.status {
                    DonationStatus::Succeeded => info!(
                        donation_id = %settled.id,
                        amount = %settled.amount,
                        currency = %settled.currency,
                        donor_email = %settled.metadata.donor_email,
                        "Donation succeeded; receipt queued for donor"
                    ),
                    _ => info!(
                        donation_id = %settled.id,
                        status = %settled.status,
                        "Donation settled"
                    ),
                }
                Ok(EventDisposition::Applied(settled))
            }
            // A concurrent delivery settled it first; classify against what
            // actually got stored
            SettleOutcome::AlreadyTerminal(current) => self.classify_terminal(current, &event),
        }
    }

    pub async fn donation(&self, id: DonationId) -> Result<Donation, DonationError> {
        self.store
            .donation(id)
            .await?
            .ok_or(DonationError::NotFound(id))
    }

    pub async fn donation_by_reference(
        &self,
        reference: &GatewayReference,
    ) -> Result<Donation, DonationError> {
        self.store
            .donation_by_reference(reference)
            .await?
            .ok_or_else(|| DonationError::UnresolvedReference(reference.clone()))
    }

    /// Duplicate-vs-conflict classification for a terminal donation
    fn classify_terminal(
        &self,
        donation: Donation,
        event: &GatewayEvent,
    ) -> Result<EventDisposition, DonationError> {
        if event.outcome.already_applied(donation.status) {
            info!(
                donation_id = %donation.id,
                status = %donation.status,
                "Duplicate gateway event ignored"
            );
            return Ok(EventDisposition::Duplicate(donation));
        }
        error!(
            donation_id = %donation.id,
            stored = %donation.status,
            incoming = %event.outcome,
            stored_trx_id = ?donation.gateway_trx_id,
            incoming_trx_id = %event.gateway_trx_id,
            "Gateway outcome conflicts with settled donation; manual review required"
        );
        Err(DonationError::OutcomeConflict {
            donation_id: donation.id,
            stored: donation.status,
            incoming: event.outcome,
            stored_trx_id: donation.gateway_trx_id,
            incoming_trx_id: event.gateway_trx_id.clone(),
        })
    }

    fn credit_for(
        &self,
        donation: &Donation,
        outcome: EventOutcome,
    ) -> Result<Option<CreditInstruction>, DonationError> {
        if outcome != EventOutcome::Success || donation.kind != DonationKind::Direct {
            return Ok(None);
        }
        match donation.recipient_id {
            Some(recipient_id) => Ok(Some(CreditInstruction {
                recipient_id,
                currency: donation.currency,
                amount: donation.amount,
            })),
            None => Err(StoreError::Corrupt(format!(
                "direct donation {} has no recipient",
                donation.id
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::money::{Amount, Currency};
    use crate::recipient::{Recipient, RecipientProfile};
    use crate::store::MemoryLedger;
    use crate::core_types::ActorId;

    async fn lifecycle() -> (DonationLifecycle, Arc<MemoryLedger>) {
        let store = Arc::new(MemoryLedger::new());
        let gateway = Arc::new(MockGateway::new());
        (
            DonationLifecycle::new(store.clone(), gateway, LimitsConfig::default()),
            store,
        )
    }

    #[tokio::test]
    async fn test_create_persists_initiated() {
        let (lifecycle, store) = lifecycle().await;
        let recipient = Recipient::new(
            RecipientProfile::new("Naomi Chebet", "Feeding program volunteer"),
            ActorId::new(),
        )
        .unwrap();
        store.insert_recipient(&recipient).await.unwrap();

        let donation = lifecycle
            .create(DonationRequest::direct(
                recipient.id,
                Amount::parse("350").unwrap(),
                Currency::KES,
                "donor@example.org",
            ))
            .await
            .unwrap();

        assert_eq!(donation.status, DonationStatus::Initiated);
        let stored = lifecycle.donation(donation.id).await.unwrap();
        assert_eq!(stored.gateway_reference, donation.gateway_reference);
        let by_ref = lifecycle
            .donation_by_reference(&donation.gateway_reference)
            .await
            .unwrap();
        assert_eq!(by_ref.id, donation.id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request() {
        let (lifecycle, _) = lifecycle().await;
        let err = lifecycle
            .create(DonationRequest::pool(
                Amount::parse("50").unwrap(),
                Currency::KES,
                "donor@example.org",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DonationError::AmountBelowMinimum { .. }));
    }

    #[tokio::test]
    async fn test_lookups_miss() {
        let (lifecycle, _) = lifecycle().await;
        assert!(matches!(
            lifecycle.donation(DonationId::new()).await,
            Err(DonationError::NotFound(_))
        ));
        assert!(matches!(
            lifecycle
                .donation_by_reference(&GatewayReference::generate())
                .await,
            Err(DonationError::UnresolvedReference(_))
        ));
    }
}
