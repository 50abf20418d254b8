//! Authorization and threshold checks.

use clubhouse_protocol::{AccountId, Threshold};

use crate::{AccessError, BalanceLookup};

/// Returns `true` iff `identity` is the club's owner or in its admin list.
///
/// Ownership alone grants authority. The owner may also be listed in
/// `admins`, and removing that entry changes nothing.
pub fn is_authorized_for_club(
    owner: &AccountId,
    admins: &[AccountId],
    identity: &AccountId,
) -> bool {
    identity == owner || admins.contains(identity)
}

/// Returns `true` iff `identity` currently satisfies `threshold`.
///
/// # Errors
/// Propagates [`AccessError`] when the balance source can't answer.
pub async fn meets_threshold<B: BalanceLookup>(
    threshold: &Threshold,
    identity: &AccountId,
    balances: &B,
) -> Result<bool, AccessError> {
    let (held, required) = match threshold {
        Threshold::None => return Ok(true),
        Threshold::Native { amount } => {
            (balances.native_balance(identity).await?, *amount)
        }
        Threshold::Token { contract, amount } => {
            (balances.token_balance(contract, identity).await?, *amount)
        }
    };

    tracing::trace!(%identity, %threshold, held, "threshold evaluated");
    Ok(held >= required)
}
