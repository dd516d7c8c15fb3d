//! Recipient Directory
//!
//! Recipients are the people and groups the platform channels funds to.
//! Their profiles (story, needs, photos, location) are freely editable by
//! administrators; their received totals are a derived per-currency
//! aggregate that only the ledger's crediting operations may change.
//!
//! # Safety Invariants
//!
//! 1. **Actor required**: registration fails closed without a real `ActorId`
//! 2. **Never deleted**: deactivation hides a recipient from public listings,
//!    the ledger history stays intact
//! 3. **Totals are ledger-owned**: nothing in this module writes
//!    `total_received`

pub mod error;
pub mod registry;
pub mod types;

pub use error::RecipientError;
pub use registry::RecipientRegistry;
pub use types::{
    CurrencyTotals, Location, Need, NeedCategory, NeedPriority, Photo, Recipient,
    RecipientProfile, VerificationStatus,
};
