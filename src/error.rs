use thiserror::Error;

use crate::ErrorCode;

/// Errors raised at the API boundary.
///
/// These cover malformed direct input (a non-power-of-two degree, an empty
/// coefficient modulus, a 62-bit modulus value, ...). Whether a fully populated
/// parameter set is mathematically usable is never reported through this type;
/// see [crate::EncryptionParameterQualifiers] for that.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A setter or constructor was handed a value of the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested operation cannot be carried out in the current state.
    #[error("logic error: {0}")]
    LogicError(String),

    /// A component was handed a context whose parameters failed validation.
    #[error("encryption parameters are not set correctly: {0}")]
    ParametersNotSet(ErrorCode),
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn logic_error(message: impl Into<String>) -> Self {
        Error::LogicError(message.into())
    }
}

/// Result type of fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
