//! Fund Allocation
//!
//! Pooled donations sit in a per-currency shared pot until an administrator
//! allocates them to a recipient. The pool balance is never stored; it is
//! derived from the entry ledger on every check:
//!
//! ```text
//! pool(c) = Σ SUCCEEDED pool donations in c − Σ pool allocations in c
//! ```
//!
//! # Safety Invariants
//!
//! 1. **No overdraw**: the balance check and the allocation append run in
//!    one per-currency critical section in the store
//! 2. **Atomic credit**: allocation entry and recipient credit are one unit
//! 3. **Append-only**: allocations are never edited; corrections are new
//!    ADJUSTMENT entries
//! 4. **Fail closed**: no allocation without a performing actor

pub mod error;
pub mod service;
pub mod types;

pub use error::AllocationError;
pub use service::AllocationService;
pub use types::{
    Allocation, AllocationFilter, AllocationRequest, AllocationSource, AllocationView,
    MAX_ALLOCATION_NOTES,
};
