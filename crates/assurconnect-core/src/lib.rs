pub mod domain;
pub mod error;
pub mod forms;
pub mod sink;
pub mod time;

pub use domain::*;
pub use error::CoreError;
pub use forms::{
    AutoQuote, ContactDetails, HealthQuote, HomeQuote, PetQuote, ProLiabilityQuote, QuoteForm,
};
pub use sink::{LeadSink, NoopSink};
