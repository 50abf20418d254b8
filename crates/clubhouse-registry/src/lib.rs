//! Club state management for Clubhouse.
//!
//! Each club runs as an isolated Tokio task (actor model) that owns its
//! admins, members, channels and messages. The [`ClubRegistry`] creates
//! clubs, routes operations to their actors, and owns the registry-wide
//! state: the [`FeeLedger`], the id counter and the per-identity indices.
//!
//! # Key types
//!
//! - [`ClubRegistry`]: the entry point for every operation
//! - [`FeeLedger`]: creation fee and withdrawable balance
//! - [`ClubView`]: a consistent snapshot of one club
//! - [`MessageCursor`] / [`MessagePage`]: channel history pagination
//! - [`RegistryConfig`]: registry owner, initial fee, actor buffer size

mod club;
mod config;
mod error;
mod ledger;
mod model;
mod registry;

pub use club::EventSender;
pub use config::{ChannelState, DEFAULT_CREATION_FEE, RegistryConfig};
pub use error::RegistryError;
pub use ledger::{Charge, FeeLedger};
pub use model::{
    ChannelView, ClubReceipt, ClubView, MessageCursor, MessagePage, NewClub,
    StoredMessage,
};
pub use registry::ClubRegistry;
