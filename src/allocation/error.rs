use rust_decimal::Decimal;
use thiserror::Error;

use crate::core_types::RecipientId;
use crate::money::{Amount, Currency, MoneyError};
use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    // === Validation Errors ===
    #[error("A performing actor is required")]
    MissingActor,

    #[error("Allocation amount {amount} is below the minimum of {minimum}")]
    AmountBelowMinimum { amount: Amount, minimum: Decimal },

    #[error("Currency {0} is not enabled on this platform")]
    CurrencyNotEnabled(Currency),

    #[error("Allocation notes exceed the maximum length of {max}")]
    NotesTooLong { max: usize },

    #[error("Actor display name must not be blank")]
    BlankActorName,

    #[error(transparent)]
    Money(#[from] MoneyError),

    // === Funds Errors ===
    #[error("Pool balance {available} cannot cover the requested {requested}")]
    InsufficientFunds {
        requested: Amount,
        available: Decimal,
    },

    // === State Errors ===
    #[error("Recipient not found: {0}")]
    RecipientNotFound(RecipientId),

    // === Infrastructure Errors ===
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AllocationError {
    pub fn code(&self) -> &'static str {
        match self {
            AllocationError::MissingActor => "MISSING_ACTOR",
            AllocationError::AmountBelowMinimum { .. } => "AMOUNT_BELOW_MINIMUM",
            AllocationError::CurrencyNotEnabled(_) => "CURRENCY_NOT_ENABLED",
            AllocationError::NotesTooLong { .. } => "NOTES_TOO_LONG",
            AllocationError::BlankActorName => "BLANK_ACTOR_NAME",
            AllocationError::Money(_) => "INVALID_AMOUNT",
            AllocationError::InsufficientFunds { .. } => "INSUFFICIENT_POOL_FUNDS",
            AllocationError::RecipientNotFound(_) => "RECIPIENT_NOT_FOUND",
            AllocationError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            AllocationError::MissingActor
            | AllocationError::AmountBelowMinimum { .. }
            | AllocationError::CurrencyNotEnabled(_)
            | AllocationError::NotesTooLong { .. }
            | AllocationError::BlankActorName
            | AllocationError::Money(_) => 400,
            AllocationError::InsufficientFunds { .. } => 422,
            AllocationError::RecipientNotFound(_) => 404,
            AllocationError::Storage(_) => 500,
        }
    }
}
