use thiserror::Error;

use crate::core_types::RecipientId;
use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecipientError {
    // === Validation Errors ===
    #[error("A registering or mutating actor is required")]
    MissingActor,

    #[error("Recipient full name must not be blank")]
    BlankName,

    #[error("Recipient bio must not be blank")]
    BlankBio,

    #[error("Field '{field}' exceeds the maximum length of {max}")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Need descriptions must not be blank")]
    BlankNeedDescription,

    #[error("Need target amounts must not be negative")]
    NegativeAmountNeeded,

    // === State Errors ===
    #[error("Recipient not found: {0}")]
    NotFound(RecipientId),

    // === Infrastructure Errors ===
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl RecipientError {
    pub fn code(&self) -> &'static str {
        match self {
            RecipientError::MissingActor => "MISSING_ACTOR",
            RecipientError::BlankName => "BLANK_NAME",
            RecipientError::BlankBio => "BLANK_BIO",
            RecipientError::FieldTooLong { .. } => "FIELD_TOO_LONG",
            RecipientError::BlankNeedDescription => "BLANK_NEED_DESCRIPTION",
            RecipientError::NegativeAmountNeeded => "NEGATIVE_AMOUNT_NEEDED",
            RecipientError::NotFound(_) => "RECIPIENT_NOT_FOUND",
            RecipientError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            RecipientError::MissingActor
            | RecipientError::BlankName
            | RecipientError::BlankBio
            | RecipientError::FieldTooLong { .. }
            | RecipientError::BlankNeedDescription
            | RecipientError::NegativeAmountNeeded => 400,
            RecipientError::NotFound(_) => 404,
            RecipientError::Storage(_) => 500,
        }
    }
}
