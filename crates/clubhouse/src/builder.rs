//! `ClubhouseBuilder`: wires a registry, its event stream and a gateway.

use std::sync::Arc;

use clubhouse_access::BalanceLookup;
use clubhouse_protocol::{
    AccountId, Amount, ClubEvent, DEFAULT_XOR_KEY, JsonCodec, MessageCodec, Scheme,
};
use clubhouse_registry::{ClubRegistry, RegistryConfig};
use tokio::sync::mpsc;

use crate::Gateway;

/// Receiving end of the registry's event stream.
pub type EventStream = mpsc::UnboundedReceiver<ClubEvent>;

/// Builder for a registry plus the gateway in front of it.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use clubhouse::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (gateway, _events) = ClubhouseBuilder::new()
///     .registry_owner(AccountId::new("treasury"))
///     .initial_fee(1000)
///     .build(Arc::new(MemoryBalances::new()));
///
/// assert_eq!(gateway.registry().fee().await, 1000);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClubhouseBuilder {
    config: RegistryConfig,
    xor_key: u8,
}

impl ClubhouseBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
            xor_key: DEFAULT_XOR_KEY,
        }
    }

    /// Replaces the whole registry configuration.
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the identity allowed to change the fee and withdraw.
    pub fn registry_owner(mut self, owner: AccountId) -> Self {
        self.config.registry_owner = owner;
        self
    }

    pub fn initial_fee(mut self, fee: Amount) -> Self {
        self.config.initial_fee = fee;
        self
    }

    /// Sets the per-club command buffer.
    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.config.command_buffer = capacity;
        self
    }

    /// Sets the scheme used when a post doesn't name one.
    pub fn default_scheme(mut self, scheme: Scheme) -> Self {
        self.config.default_scheme = scheme;
        self
    }

    /// Sets the key byte for [`Scheme::Xor`].
    pub fn xor_key(mut self, key: u8) -> Self {
        self.xor_key = key;
        self
    }

    /// Builds a JSON gateway over a fresh registry.
    ///
    /// Returns the gateway and the receiving end of the event stream.
    /// Dropping the stream is fine; events are then discarded.
    pub fn build<B: BalanceLookup>(self, balances: Arc<B>) -> (Gateway<B>, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        tracing::info!(
            registry_owner = %self.config.registry_owner,
            fee = self.config.initial_fee,
            scheme = ?self.config.default_scheme,
            "registry ready"
        );
        let registry = Arc::new(ClubRegistry::new(self.config, balances, tx));
        let gateway =
            Gateway::with_codecs(registry, JsonCodec, MessageCodec::with_key(self.xor_key));
        (gateway, rx)
    }
}

impl Default for ClubhouseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
