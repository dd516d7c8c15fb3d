//! Donation Error Types
//!
//! One flat taxonomy for the donation lifecycle; error codes are stable
//! strings the host layer can map to API responses.

use thiserror::Error;

use super::state::DonationStatus;
use super::types::EventOutcome;
use crate::core_types::{DonationId, GatewayReference};
use crate::gateway::GatewayError;
use crate::money::{Amount, MoneyError};
use crate::store::StoreError;
use rust_decimal::Decimal;

/// Donation lifecycle errors
#[derive(Error, Debug, Clone)]
pub enum DonationError {
    // === Validation Errors ===
    #[error("Amount {amount} is below the configured minimum {minimum}")]
    AmountBelowMinimum { amount: Amount, minimum: Decimal },

    #[error("Currency {0} is not enabled for this deployment")]
    CurrencyNotEnabled(crate::money::Currency),

    #[error("Direct donations require a recipient")]
    MissingRecipient,

    #[error("Pool donations must not name a recipient")]
    UnexpectedRecipient,

    #[error("Donor email is required to initialize payment")]
    MissingDonorEmail,

    #[error("Field '{field}' exceeds the maximum length of {max}")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Invalid amount: {0}")]
    Money(#[from] MoneyError),

    // === Webhook Errors ===
    #[error("No donation matches gateway reference {0}")]
    UnresolvedReference(GatewayReference),

    #[error(
        "Event outcome {incoming} conflicts with terminal status {stored} for donation {donation_id}"
    )]
    OutcomeConflict {
        donation_id: DonationId,
        stored: DonationStatus,
        incoming: EventOutcome,
        stored_trx_id: Option<String>,
        incoming_trx_id: String,
    },

    // === State Errors ===
    #[error("Donation not found: {0}")]
    NotFound(DonationId),

    #[error("Payment can only begin from INITIATED; donation {donation_id} is {status}")]
    AlreadyBegun {
        donation_id: DonationId,
        status: DonationStatus,
    },

    // === Gateway Errors ===
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    // === System Errors ===
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl DonationError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            DonationError::AmountBelowMinimum { .. } => "AMOUNT_BELOW_MINIMUM",
            DonationError::CurrencyNotEnabled(_) => "CURRENCY_NOT_ENABLED",
            DonationError::MissingRecipient => "MISSING_RECIPIENT",
            DonationError::UnexpectedRecipient => "UNEXPECTED_RECIPIENT",
            DonationError::MissingDonorEmail => "MISSING_DONOR_EMAIL",
            DonationError::FieldTooLong { .. } => "FIELD_TOO_LONG",
            DonationError::Money(_) => "INVALID_AMOUNT",
            DonationError::UnresolvedReference(_) => "UNRESOLVED_REFERENCE",
            DonationError::OutcomeConflict { .. } => "OUTCOME_CONFLICT",
            DonationError::NotFound(_) => "DONATION_NOT_FOUND",
            DonationError::AlreadyBegun { .. } => "ALREADY_BEGUN",
            DonationError::Gateway(e) => e.code(),
            DonationError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            DonationError::AmountBelowMinimum { .. }
            | DonationError::CurrencyNotEnabled(_)
            | DonationError::MissingRecipient
            | DonationError::UnexpectedRecipient
            | DonationError::MissingDonorEmail
            | DonationError::FieldTooLong { .. }
            | DonationError::Money(_) => 400,
            DonationError::UnresolvedReference(_) | DonationError::NotFound(_) => 404,
            DonationError::OutcomeConflict { .. } | DonationError::AlreadyBegun { .. } => 409,
            DonationError::Gateway(e) => e.http_status(),
            DonationError::Storage(_) => 500,
        }
    }

    /// Whether the caller may retry the same call unchanged
    ///
    /// Only gateway-boundary failures that left the donation INITIATED
    /// qualify; everything else either succeeded in a prior delivery or
    /// needs a changed request.
    pub fn retryable(&self) -> bool {
        matches!(self, DonationError::Gateway(e) if e.retryable())
    }

    /// Whether the webhook endpoint should still acknowledge the delivery
    ///
    /// Unresolvable references and outcome conflicts are logged and acked:
    /// redelivery cannot fix them, and a non-2xx ack would make the gateway
    /// hammer us with the same event. Internal faults are NOT acked so the
    /// gateway redelivers once we recover.
    pub fn acknowledge(&self) -> bool {
        matches!(
            self,
            DonationError::UnresolvedReference(_) | DonationError::OutcomeConflict { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DonationError::MissingRecipient.code(),
            "MISSING_RECIPIENT"
        );
        assert_eq!(
            DonationError::UnresolvedReference(GatewayReference::from("donation_x")).code(),
            "UNRESOLVED_REFERENCE"
        );
        assert_eq!(
            DonationError::CurrencyNotEnabled(Currency::USD).code(),
            "CURRENCY_NOT_ENABLED"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(DonationError::MissingDonorEmail.http_status(), 400);
        assert_eq!(
            DonationError::NotFound(DonationId::new()).http_status(),
            404
        );
        assert_eq!(
            DonationError::OutcomeConflict {
                donation_id: DonationId::new(),
                stored: DonationStatus::Succeeded,
                incoming: EventOutcome::Failure,
                stored_trx_id: Some("trx_1".into()),
                incoming_trx_id: "trx_2".into(),
            }
            .http_status(),
            409
        );
        assert_eq!(
            DonationError::Gateway(GatewayError::Configuration("secret key".into()))
                .http_status(),
            503
        );
    }

    #[test]
    fn test_retryable() {
        assert!(DonationError::Gateway(GatewayError::Timeout { seconds: 30 }).retryable());
        assert!(DonationError::Gateway(GatewayError::Network("reset".into())).retryable());
        assert!(
            DonationError::Gateway(GatewayError::Rejected {
                reason: "bad currency".into()
            })
            .retryable()
        );
        assert!(
            !DonationError::Gateway(GatewayError::Configuration("secret key".into())).retryable()
        );
        assert!(!DonationError::MissingDonorEmail.retryable());
    }

    #[test]
    fn test_webhook_acknowledgement() {
        assert!(DonationError::UnresolvedReference(GatewayReference::from("donation_x"))
            .acknowledge());
        assert!(DonationError::OutcomeConflict {
            donation_id: DonationId::new(),
            stored: DonationStatus::Succeeded,
            incoming: EventOutcome::Failure,
            stored_trx_id: None,
            incoming_trx_id: "trx_2".into(),
        }
        .acknowledge());

        // Internal faults must bounce so the gateway redelivers
        assert!(!DonationError::Storage(StoreError::Database("down".into())).acknowledge());
    }

    #[test]
    fn test_display() {
        let err = DonationError::MissingRecipient;
        assert_eq!(err.to_string(), "Direct donations require a recipient");
    }
}
