use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown lead category: {0}")]
    UnknownCategory(String),
    #[error("unknown lead status: {0}")]
    UnknownStatus(String),
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} must be at least {min} characters")]
    FieldTooShort { field: &'static str, min: usize },
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("consent is required")]
    ConsentRequired,
    #[error("payload must be a JSON object")]
    PayloadNotObject,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
