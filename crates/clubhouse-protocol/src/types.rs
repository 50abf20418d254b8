//! Core identity and policy types.
//!
//! Everything here is plain data: cheap to clone, serializable, and free of
//! any knowledge about where it is stored.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

/// An amount of native currency or of a fungible token, in base units.
pub type Amount = u128;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An authenticated caller identity, as resolved by the transport.
///
/// The registry treats this as opaque: it compares identities for equality
/// and uses them as map keys, nothing more. Authentication happens before a
/// call ever reaches the registry.
///
/// `#[serde(transparent)]` makes `AccountId("0xabc")` serialize as the plain
/// string `"0xabc"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps any string-like identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A club's identifier.
///
/// Assigned sequentially starting at 0 and never reused, so it doubles as
/// the club's creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClubId(pub u64);

impl fmt::Display for ClubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// The balance gate a caller must pass to post messages in a club.
///
/// Kind and amount live in the same variant, so replacing a threshold can
/// never leave one of them stale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Anyone may post.
    #[default]
    None,

    /// The caller's native currency balance must be at least `amount`.
    Native { amount: Amount },

    /// The caller's balance of the fungible token at `contract` must be at
    /// least `amount`.
    Token { contract: AccountId, amount: Amount },
}

/// The discriminant of a [`Threshold`], as transports usually send it
/// (a kind code next to loose amount/contract fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    None,
    Native,
    Token,
}

impl Threshold {
    /// Builds a threshold from loose parts, rejecting combinations that
    /// do not describe a policy.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] when a token threshold has
    /// no contract, or a contract is given for a non-token kind.
    pub fn from_parts(
        kind: ThresholdKind,
        amount: Amount,
        contract: Option<AccountId>,
    ) -> Result<Self, ProtocolError> {
        match (kind, contract) {
            (ThresholdKind::None, None) => Ok(Self::None),
            (ThresholdKind::Native, None) => Ok(Self::Native { amount }),
            (ThresholdKind::Token, Some(contract)) => {
                Ok(Self::Token { contract, amount })
            }
            (ThresholdKind::Token, None) => Err(ProtocolError::InvalidMessage(
                "token threshold requires a contract".into(),
            )),
            (kind, Some(contract)) => Err(ProtocolError::InvalidMessage(
                format!("{kind:?} threshold does not take a contract ({contract})"),
            )),
        }
    }

    /// Returns the kind of this threshold.
    pub fn kind(&self) -> ThresholdKind {
        match self {
            Self::None => ThresholdKind::None,
            Self::Native { .. } => ThresholdKind::Native,
            Self::Token { .. } => ThresholdKind::Token,
        }
    }

    /// Returns the required amount (0 for [`Threshold::None`]).
    pub fn amount(&self) -> Amount {
        match self {
            Self::None => 0,
            Self::Native { amount } | Self::Token { amount, .. } => *amount,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Native { amount } => write!(f, "native>={amount}"),
            Self::Token { contract, amount } => {
                write!(f, "token({contract})>={amount}")
            }
        }
    }
}
