use thiserror::Error;

/// Validation errors raised by record setters.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid status code: {0} (expected 100..=599)")]
    InvalidStatusCode(u16),
}
