//! Paystack Gateway Client
//!
//! Implements [`PaymentGateway`] over Paystack's hosted-checkout API:
//! `POST /transaction/initialize` with Bearer auth, amounts in minor units,
//! and `charge.*` webhook payload decoding. The webhook transport signature
//! is the host layer's concern; this module only maps payload shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::adapter::{GatewayError, GatewaySession, PaymentGateway, PaymentInit};
use crate::config::GatewayConfig;
use crate::core_types::GatewayReference;
use crate::donation::{EventOutcome, GatewayEvent};

/// Paystack HTTP client
///
/// Construction fails fast when the secret key is absent - a deployment
/// without credentials must not look healthy until the first donation.
pub struct PaystackGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
    callback_url: Option<String>,
    timeout_secs: u64,
}

impl PaystackGateway {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let secret_key = config
            .secret_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::Configuration("secret key is not set".into()))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key,
            callback_url: config.callback_url.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

// Manual Debug: the secret key must never reach a log line.
impl fmt::Debug for PaystackGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaystackGateway")
            .field("base_url", &self.base_url)
            .field("secret_key", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize(&self, init: &PaymentInit) -> Result<GatewaySession, GatewayError> {
        let amount = init
            .amount
            .minor_units(init.currency)
            .map_err(|e| GatewayError::Rejected {
                reason: e.to_string(),
            })?;

        let request = InitializeRequest {
            email: &init.donor_email,
            amount,
            currency: init.currency.code(),
            reference: init.reference.as_str(),
            callback_url: self.callback_url.as_deref(),
            metadata: InitializeMetadata {
                donation_id: init.donation_id.to_string(),
                kind: init.kind.as_str(),
            },
        };

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        seconds: self.timeout_secs,
                    }
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

        let http_status = response.status();
        let parsed: InitializeResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !http_status.is_success() || !parsed.status {
            return Err(GatewayError::Rejected {
                reason: parsed.message,
            });
        }

        let data = parsed.data.ok_or_else(|| GatewayError::Rejected {
            reason: "initialize response carried no data".into(),
        })?;

        Ok(GatewaySession {
            redirect_url: data.authorization_url,
            reference: GatewayReference::from(data.reference),
        })
    }
}

// ============================================================================
// Wire DTOs
// ============================================================================

#[derive(Debug, Serialize)]
struct InitializeRequest<'a> {
    email: &'a str,
    /// Minor units (kobo / cents), per the Paystack contract
    amount: i64,
    currency: &'a str,
    reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
    metadata: InitializeMetadata,
}

#[derive(Debug, Serialize)]
struct InitializeMetadata {
    donation_id: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    reference: String,
    /// Paystack's numeric transaction id
    id: i64,
}

// ============================================================================
// Webhook decoding
// ============================================================================

/// A decoded webhook body
#[derive(Debug, Clone)]
pub enum WebhookDelivery {
    /// A charge outcome the lifecycle manager must apply
    Settlement(GatewayEvent),
    /// Any other event type - acknowledged and skipped
    Ignored { event: String },
}

/// Map a raw Paystack webhook body to the lifecycle event vocabulary
///
/// `charge.success` and `charge.failed` become settlements; everything else
/// is reported back as ignorable so the host can ack it after logging.
pub fn decode_webhook(body: &[u8]) -> Result<WebhookDelivery, serde_json::Error> {
    let envelope: WebhookEnvelope = serde_json::from_slice(body)?;
    let outcome = match envelope.event.as_str() {
        "charge.success" => EventOutcome::Success,
        "charge.failed" => EventOutcome::Failure,
        _ => {
            return Ok(WebhookDelivery::Ignored {
                event: envelope.event,
            });
        }
    };

    Ok(WebhookDelivery::Settlement(GatewayEvent {
        event_type: envelope.event,
        reference: GatewayReference::from(envelope.data.reference),
        gateway_trx_id: envelope.data.id.to_string(),
        outcome,
    }))
}
