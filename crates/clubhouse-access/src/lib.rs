//! Access control for Clubhouse.
//!
//! Two questions get answered here:
//!
//! 1. **May this caller administer the club?** ([`is_authorized_for_club`])
//!    The owner always may; anyone in the explicit admin list may.
//! 2. **May this caller post?** ([`meets_threshold`])
//!    Decided by the club's [`Threshold`](clubhouse_protocol::Threshold)
//!    and a live balance read through the [`BalanceLookup`] collaborator.
//!
//! # How it fits in the stack
//!
//! ```text
//! Registry (above)  ← asks before every mutation / message append
//!     ↕
//! Access (this crate)  ← pure checks + balance collaborator
//!     ↕
//! Protocol (below)  ← AccountId, Threshold
//! ```

mod balance;
mod error;
mod policy;

pub use balance::{BalanceLookup, MemoryBalances};
pub use error::AccessError;
pub use policy::{is_authorized_for_club, meets_threshold};
