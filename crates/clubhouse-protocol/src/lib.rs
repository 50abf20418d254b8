//! Shared vocabulary for Clubhouse.
//!
//! This crate defines what every other layer talks about:
//!
//! - **Types** ([`AccountId`], [`ClubId`], [`Threshold`]): identities and
//!   the access policy attached to a club.
//! - **Events** ([`ClubEvent`]): one structured record per committed state
//!   change, handed to external indexers.
//! - **Message codec** ([`MessageCodec`]): how channel content is turned
//!   into the tagged bytes the registry stores.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how requests, replies and
//!   events travel as bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Gateway (Request) → Registry (club actors)
//!                         ↑                     │
//!                  protocol types        ClubEvent stream
//! ```
//!
//! The protocol layer knows nothing about clubs as running state; it only
//! names things and converts them to and from bytes.

mod codec;
mod error;
mod event;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{ClubEvent, ClubField};
pub use message::{ChannelMessage, MessageCodec, MessageKind, Scheme, DEFAULT_XOR_KEY};
pub use types::{AccountId, Amount, ClubId, Threshold, ThresholdKind};
