//! Error types for meeting AI operations.

use std::fmt;

/// Universal error type that abstracts provider-specific failures into
/// common variants.
///
/// All vendor clients map their native errors onto these variants so the
/// pipeline can distinguish failure classes (and decide retry policy) with
/// no knowledge of the vendor behind the trait. Under the current policy
/// none of these are retried automatically; the first failure is terminal
/// for the pipeline run and operators re-enqueue.
#[derive(Debug)]
pub enum Error {
    /// Missing or unusable credentials/configuration. Fails fast at client
    /// construction, before any network call is made.
    Configuration(String),

    /// A referenced input (audio file, vendor job) does not exist.
    NotFound(String),

    /// Network connectivity issues, DNS failures, or connection resets.
    Network(String),

    /// The vendor answered with a non-2xx status or an explicit failure
    /// state. Carries the vendor-reported detail when one was extractable.
    Provider(String),

    /// A polling loop exhausted its wall-clock budget.
    Timeout(String),

    /// Failed to serialize a request payload.
    Serialization(String),

    /// The vendor answered 2xx but the body did not match the expected
    /// shape (e.g. non-JSON output from the summarizer).
    Deserialization(String),

    /// Catch-all for unexpected errors that fit no other category.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
