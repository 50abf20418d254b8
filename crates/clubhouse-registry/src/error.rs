//! Error types for the registry layer.

use clubhouse_access::AccessError;
use clubhouse_protocol::{AccountId, Amount, ClubId};

/// Errors that can occur during registry operations.
///
/// Every failing operation leaves club, channel, membership and fee state
/// exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The caller is neither the club's owner nor one of its admins.
    #[error("{0} is not authorized for club {1}")]
    NotAuthorized(AccountId, ClubId),

    /// The caller is not the registry owner (fee and withdrawal control).
    #[error("{0} is not the registry owner")]
    NotRegistryOwner(AccountId),

    /// The caller's balance is below the club's posting threshold.
    #[error("{0} does not meet the posting threshold of club {1}")]
    BelowThreshold(AccountId, ClubId),

    /// The club does not exist.
    #[error("club {0} not found")]
    ClubNotFound(ClubId),

    /// The channel index was never assigned in this club.
    #[error("channel {1} not found in club {0}")]
    ChannelNotFound(ClubId, u32),

    /// The identity is not in the club's explicit admin list.
    #[error("{0} is not an admin of club {1}")]
    AdminNotFound(AccountId, ClubId),

    /// Creation payment is below the current fee.
    #[error("insufficient payment: required {required}, paid {paid}")]
    InsufficientPayment { required: Amount, paid: Amount },

    /// The identity already joined the club.
    #[error("{0} already joined club {1}")]
    AlreadyMember(AccountId, ClubId),

    /// The target is in a state that doesn't allow this operation,
    /// e.g. renaming or posting to a deleted channel.
    #[error("invalid state for this operation: {0}")]
    InvalidState(String),

    /// The balance source could not evaluate a threshold.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The club's actor is gone (runtime shutting down).
    #[error("club {0} is unavailable")]
    Unavailable(ClubId),
}

impl RegistryError {
    /// Returns `true` for authorization and threshold failures.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::NotAuthorized(..) | Self::NotRegistryOwner(_) | Self::BelowThreshold(..)
        )
    }

    /// Returns `true` when a referenced club, channel or admin is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ClubNotFound(_) | Self::ChannelNotFound(..) | Self::AdminNotFound(..)
        )
    }
}
