//! Payment Gateway Boundary
//!
//! Everything that talks to (or stands in for) the external payment
//! processor:
//!
//! - [`PaymentGateway`] - the capability the lifecycle manager is
//!   constructed with; one `initialize` call per donation attempt
//! - [`PaystackGateway`] - the production client (hosted checkout,
//!   Bearer auth, minor-unit amounts, request timeout)
//! - [`MockGateway`] - the in-process double for tests
//! - [`decode_webhook`] - maps raw `charge.*` webhook bodies into the
//!   lifecycle event vocabulary
//!
//! The adapter never mutates donation records; persisting the gateway
//! reference and the PENDING transition is the lifecycle manager's job.

pub mod adapter;
pub mod paystack;

pub use adapter::{GatewayError, GatewaySession, MockGateway, PaymentGateway, PaymentInit};
pub use paystack::{PaystackGateway, WebhookDelivery, decode_webhook};
