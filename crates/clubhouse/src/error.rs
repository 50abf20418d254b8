//! Unified error type for Clubhouse.

use clubhouse_protocol::ProtocolError;
use clubhouse_registry::RegistryError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `clubhouse` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically. Balance
/// lookup failures arrive as [`RegistryError::Access`].
#[derive(Debug, thiserror::Error)]
pub enum ClubhouseError {
    /// Bytes could not be turned into a value (request JSON, message content).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry operation was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Coarse classification of a failure, as a client sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    InsufficientPayment,
    InvalidState,
    DecodingError,
    Conflict,
    Unavailable,
}

impl ErrorKind {
    /// Numeric code used in [`Reply::Error`](crate::Reply::Error).
    pub fn code(self) -> u16 {
        match self {
            Self::InvalidState | Self::DecodingError => 400,
            Self::Unauthorized => 401,
            Self::InsufficientPayment => 402,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unavailable => 503,
        }
    }
}

impl ClubhouseError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(ProtocolError::InvalidMessage(_)) => ErrorKind::InvalidState,
            Self::Protocol(_) => ErrorKind::DecodingError,
            Self::Registry(e) => match e {
                RegistryError::NotAuthorized(..)
                | RegistryError::NotRegistryOwner(_)
                | RegistryError::BelowThreshold(..) => ErrorKind::Unauthorized,
                RegistryError::ClubNotFound(_)
                | RegistryError::ChannelNotFound(..)
                | RegistryError::AdminNotFound(..) => ErrorKind::NotFound,
                RegistryError::InsufficientPayment { .. } => {
                    ErrorKind::InsufficientPayment
                }
                RegistryError::AlreadyMember(..) => ErrorKind::Conflict,
                RegistryError::InvalidState(_) => ErrorKind::InvalidState,
                RegistryError::Access(_) | RegistryError::Unavailable(_) => {
                    ErrorKind::Unavailable
                }
            },
        }
    }
}
