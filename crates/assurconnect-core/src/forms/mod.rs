//! Typed quote-request forms.
//!
//! Each insurance line has its own input struct with field-level checks.
//! A form only becomes an untyped [`Payload`] at the store boundary, through
//! [`QuoteForm::to_payload`].

mod fields;
mod quotes;

pub use fields::{validate_email, validate_phone};
pub use quotes::{AutoQuote, ContactDetails, HealthQuote, HomeQuote, PetQuote, ProLiabilityQuote};

use crate::domain::{LeadCategory, Payload};
use crate::error::CoreError;
use serde::Serialize;

pub trait QuoteForm: Serialize {
    const CATEGORY: LeadCategory;

    fn validate(&self) -> Result<(), CoreError>;

    fn to_payload(&self) -> Result<Payload, CoreError> {
        self.validate()?;
        Payload::from_serializable(self)
    }
}
