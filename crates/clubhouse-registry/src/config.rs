//! Registry configuration and channel state.

use clubhouse_protocol::{AccountId, Amount, Scheme};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Default creation fee: 0.001 of an
/// 18-decimal native currency.
pub const DEFAULT_CREATION_FEE: Amount = 1_000_000_000_000_000;

/// Configuration for a registry instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The single identity allowed to change the fee and withdraw.
    pub registry_owner: AccountId,

    /// Creation fee in effect when the registry starts.
    pub initial_fee: Amount,

    /// Bounded command buffer per club actor. Callers wait when it is full.
    pub command_buffer: usize,

    /// Scheme clients should use when encoding channel content.
    /// The registry stores whatever bytes it is given.
    pub default_scheme: Scheme,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_owner: AccountId::new("registry"),
            initial_fee: DEFAULT_CREATION_FEE,
            command_buffer: 64,
            default_scheme: Scheme::Raw,
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelState
// ---------------------------------------------------------------------------

/// Soft-delete state of a channel.
///
/// ```text
/// Active → Deleted
/// ```
///
/// A deleted channel keeps its index and its history. It rejects appends
/// and renames; deleting it again is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    #[default]
    Active,
    Deleted,
}

impl ChannelState {
    /// Returns `true` if the channel accepts messages and renames.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Deleted => write!(f, "Deleted"),
        }
    }
}
