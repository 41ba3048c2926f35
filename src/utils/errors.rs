#![forbid(unsafe_code)]

use poem::http::StatusCode;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("greeter_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Inaccessible or invalid logger configuration.
    #[error("Unable to initialize Log4rs logging from: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),
}

/// The errors a caller of the greeting endpoint can see.  Both are terminal
/// and are reported as a JSON error body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreeterError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid Input")]
    InvalidInput,
}

impl GreeterError {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            GreeterError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GreeterError::InvalidInput => StatusCode::BAD_REQUEST,
        }
    }
}
