//! Harambee - Donation Ledger Core
//!
//! The donation lifecycle and fund ledger for a direct-giving platform,
//! built around one rule: money movements are recorded exactly once.
//!
//! # Modules
//!
//! - [`core_types`] - ULID identifiers and the gateway reference
//! - [`money`] - Currency set and the validated Amount type
//! - [`config`] - Deployment limits, logging, and gateway settings
//! - [`donation`] - Donation state machine, payment begin, webhook settlement
//! - [`recipient`] - Recipient profiles, verification, received totals
//! - [`allocation`] - Pool draws and adjustment credits to recipients
//! - [`gateway`] - Paystack client, webhook decoding, test double
//! - [`store`] - The [`store::LedgerStore`] trait with memory and Postgres backends
//! - [`logging`] - tracing subscriber setup with file rotation

// Identity and money primitives - must be first!
pub mod core_types;
pub mod money;

// Ambient concerns
pub mod config;
pub mod logging;

// Ledger components
pub mod allocation;
pub mod donation;
pub mod gateway;
pub mod recipient;
pub mod store;

// Convenient re-exports at crate root
pub use config::{GatewayConfig, LimitsConfig, LogConfig, PlatformConfig};
pub use core_types::{ActorId, AllocationId, DonationId, DonorId, GatewayReference, RecipientId};
pub use money::{Amount, Currency, MoneyError};

pub use allocation::{
    Allocation, AllocationError, AllocationFilter, AllocationRequest, AllocationService,
    AllocationSource, AllocationView,
};
pub use donation::{
    Donation, DonationError, DonationKind, DonationLifecycle, DonationRequest, DonationStatus,
    EventDisposition, EventOutcome, GatewayEvent, PaymentSession,
};
pub use gateway::{
    GatewayError, GatewaySession, MockGateway, PaymentGateway, PaymentInit, PaystackGateway,
};
pub use recipient::{
    Recipient, RecipientError, RecipientProfile, RecipientRegistry, VerificationStatus,
};
pub use store::{
    AllocationOutcome, CreditInstruction, LedgerStore, MemoryLedger, PgLedger, StoreError,
};
