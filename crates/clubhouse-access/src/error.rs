//! Error types for the access layer.

use clubhouse_protocol::AccountId;

/// Errors raised while evaluating a balance threshold.
///
/// A failed check is not an error (it is `Ok(false)`); these variants mean
/// the check could not be made at all.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The balance source could not answer (network, node, RPC failure).
    #[error("balance lookup failed: {0}")]
    LookupFailed(String),

    /// The referenced token contract is not known to the balance source.
    #[error("unknown token contract {0}")]
    UnknownToken(AccountId),
}
