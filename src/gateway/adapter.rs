//! Payment Gateway Adapter Contract
//!
//! The lifecycle manager only ever sees this trait; the concrete Paystack
//! client and the test mock both live behind it. The adapter is a pure
//! translation boundary - it never mutates the donation record.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

use crate::core_types::{DonationId, GatewayReference};
use crate::donation::DonationKind;
use crate::money::{Amount, Currency};

/// Gateway boundary failures, distinguishable so the caller can decide
/// whether a retry makes sense
#[derive(Debug, Error, Clone)]
pub enum GatewayError {
    /// Credential or endpoint missing - no outbound call was attempted
    #[error("Gateway configuration missing: {0}")]
    Configuration(String),

    /// The gateway answered and refused the request parameters
    #[error("Gateway rejected the request: {reason}")]
    Rejected { reason: String },

    /// Deadline exceeded - outcome unknown, safe to retry the initialize
    #[error("Gateway call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Transport failure before any gateway answer
    #[error("Gateway network error: {0}")]
    Network(String),
}

impl GatewayError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "GATEWAY_NOT_CONFIGURED",
            GatewayError::Rejected { .. } => "GATEWAY_REJECTED",
            GatewayError::Timeout { .. } => "GATEWAY_TIMEOUT",
            GatewayError::Network(_) => "GATEWAY_UNREACHABLE",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Configuration(_) => 503,
            GatewayError::Rejected { .. } => 502,
            GatewayError::Timeout { .. } => 504,
            GatewayError::Network(_) => 502,
        }
    }

    /// Whether retrying the same initialize call can succeed.
    ///
    /// Configuration failures need an operator, not a retry.
    pub fn retryable(&self) -> bool {
        !matches!(self, GatewayError::Configuration(_))
    }
}

/// Everything the gateway needs to host a checkout for one donation
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInit {
    pub reference: GatewayReference,
    pub donor_email: String,
    pub amount: Amount,
    pub currency: Currency,
    /// Carried in gateway metadata so the hosted page can link back
    pub donation_id: DonationId,
    pub kind: DonationKind,
}

/// Normalized initialize result
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySession {
    /// Hosted checkout page the donor is sent to
    pub redirect_url: String,
    /// Reference echoed by the gateway (normally the one we supplied)
    pub reference: GatewayReference,
}

/// The payment gateway capability injected into the lifecycle manager
#[async_trait]
pub trait PaymentGateway: Send + Sync + Debug {
    /// One outbound initialize call; exactly one of session or error
    async fn initialize(&self, init: &PaymentInit) -> Result<GatewaySession, GatewayError>;
}

/// In-process gateway double for tests - no network
///
/// Counts calls, remembers the last request, and can be switched into any
/// failure mode to exercise the caller's retry posture.
#[derive(Debug)]
pub struct MockGateway {
    redirect_base: String,
    calls: AtomicU32,
    failure: Mutex<Option<GatewayError>>,
    last_init: Mutex<Option<PaymentInit>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            redirect_base: "https://checkout.example.test".to_string(),
            calls: AtomicU32::new(0),
            failure: Mutex::new(None),
            last_init: Mutex::new(None),
        }
    }

    /// Make every subsequent initialize return this error
    pub fn set_failure(&self, failure: Option<GatewayError>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// How many initialize calls reached the mock
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, for wire-shape assertions
    pub fn last_init(&self) -> Option<PaymentInit> {
        self.last_init.lock().unwrap().clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initialize(&self, init: &PaymentInit) -> Result<GatewaySession, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_init.lock().unwrap() = Some(init.clone());

        if let Some(failure) = self.failure.lock().unwrap().clone() {
            return Err(failure);
        }

        Ok(GatewaySession {
            redirect_url: format!("{}/pay/{}", self.redirect_base, init.reference),
            reference: init.reference.clone(),
        })
    }
}
