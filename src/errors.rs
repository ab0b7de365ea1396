//! Representations of various client errors

use hyper::{self, http, StatusCode};
use serde_json::Error as SerdeError;
use std::{error::Error as StdError, fmt, io::Error as IoError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A `CONTAINER:PATH` locator or another user supplied argument could not be used
    InvalidArgument(String),
    /// The daemon does not know the requested container
    ContainerNotFound(String),
    SerdeJsonError(SerdeError),
    Hyper(hyper::Error),
    Http(http::Error),
    #[allow(clippy::upper_case_acronyms)]
    IO(IoError),
    Fault {
        code: StatusCode,
        message: String,
    },
    UnsupportedScheme(String),
    MissingAuthority,
    #[cfg(feature = "tls")]
    Tls(openssl::error::ErrorStack),
}

impl From<SerdeError> for Error {
    fn from(error: SerdeError) -> Error {
        Error::SerdeJsonError(error)
    }
}

impl From<hyper::Error> for Error {
    fn from(error: hyper::Error) -> Error {
        Error::Hyper(error)
    }
}

impl From<http::Error> for Error {
    fn from(error: http::Error) -> Error {
        Error::Http(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IO(error)
    }
}

#[cfg(feature = "tls")]
impl From<openssl::error::ErrorStack> for Error {
    fn from(error: openssl::error::ErrorStack) -> Error {
        Error::Tls(error)
    }
}

impl fmt::Display for Error {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::ContainerNotFound(id) => write!(f, "No such container: {}", id),
            Error::SerdeJsonError(err) => err.fmt(f),
            Error::Hyper(err) => err.fmt(f),
            Error::Http(err) => err.fmt(f),
            Error::IO(err) => err.fmt(f),
            Error::Fault { code, message } => write!(f, "{}: {}", code, message),
            Error::UnsupportedScheme(scheme) => write!(f, "Unsupported scheme {}", scheme),
            Error::MissingAuthority => write!(f, "Docker host was missing an authority"),
            #[cfg(feature = "tls")]
            Error::Tls(err) => err.fmt(f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::SerdeJsonError(err) => Some(err),
            Error::Hyper(err) => Some(err),
            Error::Http(err) => Some(err),
            Error::IO(err) => Some(err),
            #[cfg(feature = "tls")]
            Error::Tls(err) => Some(err),
            _ => None,
        }
    }
}
