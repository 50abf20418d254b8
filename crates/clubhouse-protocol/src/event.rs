//! Notification events emitted after every committed state change.
//!
//! Events are consumed by external indexers. Within one club they are
//! emitted in commit order; across clubs there is no ordering guarantee.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, ClubId, Threshold};

/// The single-valued club fields that can be replaced in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClubField {
    Name,
    Logo,
    Description,
    Announcement,
}

impl std::fmt::Display for ClubField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Logo => write!(f, "logo"),
            Self::Description => write!(f, "description"),
            Self::Announcement => write!(f, "announcement"),
        }
    }
}

/// One structured record per state-changing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClubEvent {
    // -- Registry-wide --
    ClubCreated {
        club_id: ClubId,
        owner: AccountId,
        name: String,
        fee_charged: Amount,
    },
    FeeUpdated {
        old_fee: Amount,
        new_fee: Amount,
    },
    FeesWithdrawn {
        to: AccountId,
        amount: Amount,
    },

    // -- Administration --
    AdminAdded {
        club_id: ClubId,
        admin: AccountId,
    },
    AdminRemoved {
        club_id: ClubId,
        admin: AccountId,
    },
    ClubUpdated {
        club_id: ClubId,
        field: ClubField,
        value: String,
    },
    ThresholdUpdated {
        club_id: ClubId,
        threshold: Threshold,
    },

    // -- Channels --
    ChannelAdded {
        club_id: ClubId,
        channel_index: u32,
        name: String,
    },
    ChannelRenamed {
        club_id: ClubId,
        channel_index: u32,
        name: String,
    },
    ChannelDeleted {
        club_id: ClubId,
        channel_index: u32,
    },

    // -- Participation --
    MemberJoined {
        club_id: ClubId,
        member: AccountId,
    },
    MessagePosted {
        club_id: ClubId,
        channel_index: u32,
        message_index: u64,
        sender: AccountId,
        timestamp: u64,
    },
}

impl ClubEvent {
    /// Returns the club this event belongs to, or `None` for registry-wide
    /// events (fee changes, withdrawals).
    pub fn club_id(&self) -> Option<ClubId> {
        match self {
            Self::FeeUpdated { .. } | Self::FeesWithdrawn { .. } => None,
            Self::ClubCreated { club_id, .. }
            | Self::AdminAdded { club_id, .. }
            | Self::AdminRemoved { club_id, .. }
            | Self::ClubUpdated { club_id, .. }
            | Self::ThresholdUpdated { club_id, .. }
            | Self::ChannelAdded { club_id, .. }
            | Self::ChannelRenamed { club_id, .. }
            | Self::ChannelDeleted { club_id, .. }
            | Self::MemberJoined { club_id, .. }
            | Self::MessagePosted { club_id, .. } => Some(*club_id),
        }
    }
}
