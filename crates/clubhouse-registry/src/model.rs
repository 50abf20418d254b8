//! Data shapes handed in and out of the registry.

use clubhouse_protocol::{AccountId, Amount, ClubId, Threshold};
use serde::{Deserialize, Serialize};

use crate::ChannelState;

/// Parameters for creating a club. Only `name` is required.
///
/// ```rust
/// use clubhouse_registry::NewClub;
///
/// let params = NewClub {
///     description: "weekly games".into(),
///     initial_channel: Some("general".into()),
///     ..NewClub::named("chess")
/// };
/// assert_eq!(params.name, "chess");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewClub {
    pub name: String,
    pub logo: String,
    pub description: String,
    pub announcement: String,
    pub threshold: Threshold,
    /// When set, channel 0 is created with this name.
    pub initial_channel: Option<String>,
}

impl NewClub {
    /// Parameters with just a name and everything else empty.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// What a successful creation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubReceipt {
    pub club_id: ClubId,
    /// Fee kept by the ledger.
    pub fee_charged: Amount,
    /// Overpayment owed back to the creator.
    pub refund: Amount,
}

/// A message as stored in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub sender: AccountId,
    /// Unix seconds at append time.
    pub timestamp: u64,
    pub channel_index: u32,
    /// Encoded content, see `clubhouse_protocol::MessageCodec`.
    pub content: Vec<u8>,
}

/// Where a message page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCursor {
    /// Start at this message index, counting from the oldest (0).
    Forward(u64),
    /// Start this many messages before the newest end. `FromNewest(10)`
    /// with a count of 10 yields the ten most recent messages.
    FromNewest(u64),
}

impl MessageCursor {
    /// Resolves the cursor to an absolute start index for `total` messages.
    pub fn start(self, total: u64) -> u64 {
        match self {
            Self::Forward(start) => start.min(total),
            Self::FromNewest(back) => total.saturating_sub(back),
        }
    }
}

/// One page of channel history, always in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<StoredMessage>,
    /// Messages in the channel at read time.
    pub total: u64,
}

/// Snapshot of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelView {
    pub index: u32,
    pub name: String,
    pub state: ChannelState,
    pub message_count: u64,
}

/// A consistent snapshot of a club's visible fields.
///
/// Taken inside the club's actor, so it never mixes fields from before and
/// after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubView {
    pub club_id: ClubId,
    pub owner: AccountId,
    pub name: String,
    pub logo: String,
    pub description: String,
    pub announcement: String,
    pub threshold: Threshold,
    pub admins: Vec<AccountId>,
    pub member_count: u64,
    /// Channels ever created, deleted ones included.
    pub channel_count: u32,
    pub channels: Vec<ChannelView>,
}
