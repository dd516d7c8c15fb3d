//! Donation Lifecycle
//!
//! A donation is an immutable money entry whose status walks a small state
//! machine driven by payment-gateway settlement events:
//!
//! ```text
//! INITIATED ──▶ PENDING ──▶ SUCCEEDED ──▶ REFUNDED
//!     │            │
//!     └────────────┴──────▶ FAILED
//! ```
//!
//! Settlement applies from PENDING or INITIATED (a webhook can outrun the
//! begin call); REFUNDED is reachable only by administrative action.
//!
//! Settlement is webhook-driven and webhooks are untrusted input: they can
//! arrive before the payment session is recorded, more than once, with
//! conflicting outcomes, or for unknown references.
//!
//! # Safety Invariants
//!
//! 1. **Terminal is forever**: no event overwrites SUCCEEDED, FAILED or
//!    REFUNDED; duplicates are no-ops, conflicts are reported for review
//! 2. **At-most-once credit**: a succeeded direct donation credits its
//!    recipient exactly once, atomically with the status transition
//! 3. **Webhooks never create**: an unknown reference is an error, not an
//!    insert
//! 4. **Gateway failure is not donation failure**: a failed initialize call
//!    leaves the donation INITIATED and retryable

pub mod error;
pub mod lifecycle;
pub mod state;
pub mod types;

pub use error::DonationError;
pub use lifecycle::DonationLifecycle;
pub use state::DonationStatus;
pub use types::{
    Donation, DonationKind, DonationMetadata, DonationRequest, EventDisposition, EventOutcome,
    GatewayEvent, MAX_DONATION_NOTES, MAX_DONOR_NAME, PaymentSession,
};
