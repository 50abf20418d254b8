//! Balance lookup hook for threshold evaluation.
//!
//! Clubhouse doesn't own account balances; a chain node, a wallet service
//! or a bank ledger does. The registry only needs to ask "how much does
//! this identity hold?", so that question is the [`BalanceLookup`] trait.
//! Production hosts implement it against their balance source; tests and
//! demos use [`MemoryBalances`].

use std::collections::HashMap;

use clubhouse_protocol::{AccountId, Amount};
use tokio::sync::RwLock;

use crate::AccessError;

/// Reads live balances for threshold checks.
///
/// # Example
///
/// ```rust
/// use clubhouse_access::{AccessError, BalanceLookup};
/// use clubhouse_protocol::{AccountId, Amount};
///
/// /// Everyone is rich. Only for development.
/// struct Generous;
///
/// impl BalanceLookup for Generous {
///     async fn native_balance(&self, _who: &AccountId) -> Result<Amount, AccessError> {
///         Ok(Amount::MAX)
///     }
///
///     async fn token_balance(
///         &self,
///         _contract: &AccountId,
///         _who: &AccountId,
///     ) -> Result<Amount, AccessError> {
///         Ok(Amount::MAX)
///     }
/// }
/// ```
pub trait BalanceLookup: Send + Sync + 'static {
    /// Returns `who`'s balance of the native currency.
    fn native_balance(
        &self,
        who: &AccountId,
    ) -> impl std::future::Future<Output = Result<Amount, AccessError>> + Send;

    /// Returns `who`'s balance of the fungible token at `contract`.
    fn token_balance(
        &self,
        contract: &AccountId,
        who: &AccountId,
    ) -> impl std::future::Future<Output = Result<Amount, AccessError>> + Send;
}

/// An in-memory balance book.
///
/// Unknown accounts hold 0. Token lookups against a contract that was never
/// registered fail with [`AccessError::UnknownToken`].
#[derive(Debug, Default)]
pub struct MemoryBalances {
    native: RwLock<HashMap<AccountId, Amount>>,
    tokens: RwLock<HashMap<AccountId, HashMap<AccountId, Amount>>>,
}

impl MemoryBalances {
    /// Creates an empty balance book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `who`'s native balance.
    pub async fn set_native(&self, who: AccountId, amount: Amount) {
        self.native.write().await.insert(who, amount);
    }

    /// Registers `contract` as a known token with no holders.
    pub async fn register_token(&self, contract: AccountId) {
        self.tokens.write().await.entry(contract).or_default();
    }

    /// Sets `who`'s balance of `contract`, registering the token if needed.
    pub async fn set_token(&self, contract: AccountId, who: AccountId, amount: Amount) {
        self.tokens
            .write()
            .await
            .entry(contract)
            .or_default()
            .insert(who, amount);
    }
}

impl BalanceLookup for MemoryBalances {
    async fn native_balance(&self, who: &AccountId) -> Result<Amount, AccessError> {
        Ok(self.native.read().await.get(who).copied().unwrap_or(0))
    }

    async fn token_balance(
        &self,
        contract: &AccountId,
        who: &AccountId,
    ) -> Result<Amount, AccessError> {
        let tokens = self.tokens.read().await;
        let holders = tokens
            .get(contract)
            .ok_or_else(|| AccessError::UnknownToken(contract.clone()))?;
        Ok(holders.get(who).copied().unwrap_or(0))
    }
}
