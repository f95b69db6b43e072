//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use meeting_ai::Error as MeetingAiError;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the domain layer are modeled as a tree with
/// `domain::error::Error` as the root holding an `error_kind` describing
/// what went wrong and an optional `source` preserving the original error.
/// The intent is to translate errors between layers while maintaining layer
/// boundaries: `web` depends on `domain` but not on `entity_api`, so every
/// lower-layer error is reduced here to the kinds `web` needs for mapping
/// onto HTTP status codes and detail messages.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config(String),
    Other(String),
}

/// Enum representing entity errors that bubble up from the entity layers
/// (`entity_api` and `entity`), reduced to the subset relevant here.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    /// A precondition or state-transition check rejected the operation.
    /// Carries a human-readable detail string for the API edge.
    Invalid(String),
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Timeout(String),
    /// The vendor rejected or failed the request; carries vendor detail.
    Vendor(String),
    Other(String),
}

impl Error {
    /// A validation failure the caller can act on; the message surfaces at
    /// the API edge.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid(message.into()),
            )),
        }
    }

    /// An unexpected internal failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(message.into())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid(
                detail,
            ))) => write!(f, "{detail}"),
            DomainErrorKind::External(ExternalErrorKind::Vendor(detail)) => write!(f, "{detail}"),
            DomainErrorKind::External(ExternalErrorKind::Timeout(detail)) => write!(f, "{detail}"),
            _ => match &self.source {
                Some(source) => write!(f, "{source}"),
                None => write!(f, "Domain Error: {:?}", self.error_kind),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm => {
                EntityErrorKind::Invalid("invalid query term".to_string())
            }
            EntityApiErrorKind::ValidationError => {
                EntityErrorKind::Invalid("rejected state transition".to_string())
            }
            _ => EntityErrorKind::Other("EntityApiErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

// Vendor client errors keep their failure class so the orchestrator can
// tell configuration problems, vendor failures and timeouts apart.
impl From<MeetingAiError> for Error {
    fn from(err: MeetingAiError) -> Self {
        let error_kind = match &err {
            MeetingAiError::Configuration(msg) => {
                DomainErrorKind::Internal(InternalErrorKind::Config(msg.clone()))
            }
            MeetingAiError::NotFound(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
            }
            MeetingAiError::Network(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            MeetingAiError::Provider(msg) => {
                DomainErrorKind::External(ExternalErrorKind::Vendor(msg.clone()))
            }
            MeetingAiError::Timeout(msg) => {
                DomainErrorKind::External(ExternalErrorKind::Timeout(msg.clone()))
            }
            MeetingAiError::Serialization(msg) | MeetingAiError::Deserialization(msg) => {
                DomainErrorKind::External(ExternalErrorKind::Other(msg.clone()))
            }
            MeetingAiError::Other(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
            }
            _ => DomainErrorKind::Internal(InternalErrorKind::Other("I/O error".to_string())),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JSON serialization error".to_string(),
            )),
        }
    }
}
