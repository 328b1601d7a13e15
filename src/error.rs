use alloc::string::String;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised at the construction boundary.
///
/// Per-step math never returns these; once a body or configuration has been
/// accepted, stepping it is infallible.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A physical or tuning parameter failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A fixed-capacity container is full.
    #[error("capacity of {0} exceeded")]
    CapacityExceeded(usize),
}
