use std::time::Duration;

use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    #[from]
    Custom(String),

    #[from]
    Service(ServiceError),

    MissingApiKey,

    RunTimeout {
        run_id: String,
        waited: Duration,
    },
    RunCancelled {
        run_id: String,
    },

    // -- Externals
    #[from]
    Io(std::io::Error),
    #[from]
    Dialoguer(dialoguer::Error),
    #[from]
    TomlDe(toml::de::Error),
    #[from]
    GlobSet(globset::Error),
}

impl From<&str> for Error {
    fn from(val: &str) -> Self {
        Self::Custom(val.to_string())
    }
}

// region:    --- Error Boilerplate

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::Custom(msg) => write!(fmt, "{msg}"),
            Self::Service(err) => write!(fmt, "{err}"),
            other => write!(fmt, "{other:?}"),
        }
    }
}

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate

// region:    --- ServiceError

/// A failed call against the remote assistant service.
///
/// Network, validation and rate-limit failures are not told apart; only the
/// operation name and the service's message are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub op: &'static str,
    pub message: String,
}

impl ServiceError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for ServiceError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(fmt, "Error in {}: {}", self.op, self.message)
    }
}

// endregion: --- ServiceError
