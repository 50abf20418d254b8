//! # Clubhouse
//!
//! A registry of community clubs: fee-gated creation, owner and admin
//! administration, soft-deletable channels, append-only message history,
//! and balance thresholds that decide who may post.
//!
//! The layers live in their own crates and are re-exported here:
//!
//! - [`clubhouse_protocol`]: identities, thresholds, events, codecs
//! - [`clubhouse_access`]: authorization and threshold checks
//! - [`clubhouse_registry`]: clubs, channels, members, fee ledger
//!
//! This crate adds the [`Gateway`] a transport talks to, a single
//! [`ClubhouseError`], and [`init_tracing`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use clubhouse::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClubhouseError> {
//! let (gateway, _events) = ClubhouseBuilder::new()
//!     .initial_fee(1000)
//!     .build(Arc::new(MemoryBalances::new()));
//!
//! let alice = AccountId::new("alice");
//! let reply = gateway
//!     .handle(&alice, Request::CreateClub {
//!         payment: 1000,
//!         club: NewClub::named("chess"),
//!     })
//!     .await?;
//! assert!(matches!(reply, Reply::Created(r) if r.club_id == ClubId(0)));
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod gateway;

pub use builder::{ClubhouseBuilder, EventStream};
pub use error::{ClubhouseError, ErrorKind};
pub use gateway::{Gateway, Reply, Request, TextMessage};

pub use clubhouse_access;
pub use clubhouse_protocol;
pub use clubhouse_registry;

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG`
/// (default `info`).
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Everything a typical host needs.
pub mod prelude {
    pub use crate::{
        ClubhouseBuilder, ClubhouseError, ErrorKind, EventStream, Gateway, Reply, Request,
        TextMessage, init_tracing,
    };
    pub use clubhouse_access::{BalanceLookup, MemoryBalances};
    pub use clubhouse_protocol::{
        AccountId, Amount, ChannelMessage, ClubEvent, ClubField, ClubId, MessageCodec,
        MessageKind, Scheme, Threshold, ThresholdKind,
    };
    pub use clubhouse_registry::{
        ClubReceipt, ClubRegistry, ClubView, MessageCursor, MessagePage, NewClub,
        RegistryConfig, RegistryError,
    };
}
