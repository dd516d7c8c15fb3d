//! Donation Entity Types
//!
//! The Donation record, the intake request it is validated from, and the
//! webhook event vocabulary the lifecycle manager consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::DonationError;
use super::state::DonationStatus;
use crate::config::LimitsConfig;
use crate::core_types::{DonationId, DonorId, GatewayReference, RecipientId};
use crate::money::{Amount, Currency};

pub const MAX_DONOR_NAME: usize = 100;
pub const MAX_DONATION_NOTES: usize = 1000;

/// Donation kind (where the money is headed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum DonationKind {
    /// Earmarked for one specific recipient at creation time
    Direct = 1,
    /// Contributed to the shared pool for later allocation
    Pool = 2,
}

impl DonationKind {
    /// Get numeric ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(DonationKind::Direct),
            2 => Some(DonationKind::Pool),
            _ => None,
        }
    }

    /// Get human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationKind::Direct => "DIRECT",
            DonationKind::Pool => "POOL",
        }
    }
}

impl fmt::Display for DonationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for DonationKind {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        DonationKind::from_id(value).ok_or(())
    }
}

/// Donor contact details and request provenance
///
/// The email is mandatory - the gateway initialize call cannot be made
/// without it. Everything else is best-effort context captured at the
/// intake boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationMetadata {
    pub donor_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Donation intake request from the host layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationRequest {
    pub kind: DonationKind,
    #[serde(default)]
    pub recipient_id: Option<RecipientId>,
    pub amount: Amount,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub donor_id: Option<DonorId>,
    pub donor_email: String,
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl DonationRequest {
    /// Request a donation earmarked for one recipient
    pub fn direct(
        recipient_id: RecipientId,
        amount: Amount,
        currency: Currency,
        donor_email: impl Into<String>,
    ) -> Self {
        Self {
            kind: DonationKind::Direct,
            recipient_id: Some(recipient_id),
            amount,
            currency,
            donor_id: None,
            donor_email: donor_email.into(),
            donor_name: None,
            notes: None,
            user_agent: None,
            ip_address: None,
        }
    }

    /// Request a donation into the shared pool
    pub fn pool(amount: Amount, currency: Currency, donor_email: impl Into<String>) -> Self {
        Self {
            kind: DonationKind::Pool,
            recipient_id: None,
            amount,
            currency,
            donor_id: None,
            donor_email: donor_email.into(),
            donor_name: None,
            notes: None,
            user_agent: None,
            ip_address: None,
        }
    }

    /// Attach the donor's account identity (omitted for anonymous giving)
    pub fn with_donor(mut self, donor_id: DonorId) -> Self {
        self.donor_id = Some(donor_id);
        self
    }

    pub fn with_donor_name(mut self, name: impl Into<String>) -> Self {
        self.donor_name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Record where the request physically came from
    pub fn with_provenance(
        mut self,
        user_agent: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        self.user_agent = Some(user_agent.into());
        self.ip_address = Some(ip_address.into());
        self
    }
}

/// One funding attempt, from intake through gateway settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub donor_id: Option<DonorId>,
    pub kind: DonationKind,
    pub recipient_id: Option<RecipientId>,
    pub amount: Amount,
    pub currency: Currency,
    pub status: DonationStatus,
    /// Assigned at creation so a webhook can resolve the donation even if
    /// it lands before the initialize response is persisted
    pub gateway_reference: GatewayReference,
    /// Set only once the gateway settles the charge
    pub gateway_trx_id: Option<String>,
    pub metadata: DonationMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    /// Validate an intake request and build the INITIATED record
    ///
    /// # Errors
    /// * `MissingDonorEmail` - blank email (gateway initialize needs it)
    /// * `MissingRecipient` - DIRECT without a recipient
    /// * `UnexpectedRecipient` - POOL naming a recipient
    /// * `FieldTooLong` - oversized donor name or notes
    /// * `CurrencyNotEnabled` - currency outside the configured set
    /// * `AmountBelowMinimum` - amount under the configured floor
    pub fn from_request(
        request: DonationRequest,
        limits: &LimitsConfig,
    ) -> Result<Self, DonationError> {
        if request.donor_email.trim().is_empty() {
            return Err(DonationError::MissingDonorEmail);
        }
        match (request.kind, request.recipient_id) {
            (DonationKind::Direct, None) => return Err(DonationError::MissingRecipient),
            (DonationKind::Pool, Some(_)) => return Err(DonationError::UnexpectedRecipient),
            _ => {}
        }
        if let Some(name) = &request.donor_name {
            if name.len() > MAX_DONOR_NAME {
                return Err(DonationError::FieldTooLong {
                    field: "donor_name",
                    max: MAX_DONOR_NAME,
                });
            }
        }
        if let Some(notes) = &request.notes {
            if notes.len() > MAX_DONATION_NOTES {
                return Err(DonationError::FieldTooLong {
                    field: "notes",
                    max: MAX_DONATION_NOTES,
                });
            }
        }
        if !limits.currency_enabled(request.currency) {
            return Err(DonationError::CurrencyNotEnabled(request.currency));
        }
        if request.amount.value() < limits.min_donation {
            return Err(DonationError::AmountBelowMinimum {
                amount: request.amount,
                minimum: limits.min_donation,
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: DonationId::new(),
            donor_id: request.donor_id,
            kind: request.kind,
            recipient_id: request.recipient_id,
            amount: request.amount,
            currency: request.currency,
            status: DonationStatus::Initiated,
            gateway_reference: GatewayReference::generate(),
            gateway_trx_id: None,
            metadata: DonationMetadata {
                donor_email: request.donor_email,
                donor_name: request.donor_name,
                notes: request.notes,
                user_agent: request.user_agent,
                ip_address: request.ip_address,
            },
            created_at: now,
            updated_at: now,
        })
    }
}

impl fmt::Display for Donation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Donation[{}] {} {} {} status={} ref={}",
            self.id, self.kind, self.amount, self.currency, self.status, self.gateway_reference
        )
    }
}

/// Outcome reported by a gateway event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventOutcome {
    Success,
    Failure,
}

impl EventOutcome {
    /// The terminal status this outcome settles a donation into
    pub fn target_status(&self) -> DonationStatus {
        match self {
            EventOutcome::Success => DonationStatus::Succeeded,
            EventOutcome::Failure => DonationStatus::Failed,
        }
    }

    /// Whether a stored terminal status already reflects this outcome.
    ///
    /// A success event against a REFUNDED donation counts as already
    /// applied: the refund implies an earlier recorded success, so the
    /// redelivery carries no new information.
    pub fn already_applied(&self, status: DonationStatus) -> bool {
        matches!(
            (self, status),
            (EventOutcome::Success, DonationStatus::Succeeded)
                | (EventOutcome::Success, DonationStatus::Refunded)
                | (EventOutcome::Failure, DonationStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventOutcome::Success => "SUCCESS",
            EventOutcome::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized webhook event from the payment gateway
///
/// At-least-once delivery: the same event may arrive twice, late, or out of
/// order with respect to the initialize response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEvent {
    pub event_type: String,
    pub reference: GatewayReference,
    pub gateway_trx_id: String,
    pub outcome: EventOutcome,
}

impl GatewayEvent {
    pub fn success(reference: GatewayReference, gateway_trx_id: impl Into<String>) -> Self {
        Self {
            event_type: "charge.success".to_string(),
            reference,
            gateway_trx_id: gateway_trx_id.into(),
            outcome: EventOutcome::Success,
        }
    }

    pub fn failure(reference: GatewayReference, gateway_trx_id: impl Into<String>) -> Self {
        Self {
            event_type: "charge.failed".to_string(),
            reference,
            gateway_trx_id: gateway_trx_id.into(),
            outcome: EventOutcome::Failure,
        }
    }
}

/// What applying a webhook event did
#[derive(Debug, Clone)]
pub enum EventDisposition {
    /// The event settled the donation (and credited the recipient for a
    /// direct success)
    Applied(Donation),
    /// Redelivery of an outcome already recorded - nothing changed
    Duplicate(Donation),
}

impl EventDisposition {
    pub fn donation(&self) -> &Donation {
        match self {
            EventDisposition::Applied(d) | EventDisposition::Duplicate(d) => d,
        }
    }

    #[inline]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, EventDisposition::Duplicate(_))
    }
}

/// Redirect handle returned once the gateway accepts initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    pub donation_id: DonationId,
    pub redirect_url: String,
    pub gateway_reference: GatewayReference,
}
