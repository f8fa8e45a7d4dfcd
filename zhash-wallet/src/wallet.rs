//! Wallet connection state
//!
//! Connecting is simulated: after a short delay every provider yields the same
//! placeholder account on the fhEVM network.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scheduler::Scheduler;

/// Placeholder account handed out by every provider
pub const MOCK_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

/// Zama fhEVM chain id
pub const FHEVM_CHAIN_ID: u64 = 9090;

/// Snapshot of the wallet connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    /// Connected account, if any
    address: Option<String>,
    /// Connected network, if any
    chain_id: Option<u64>,
}

impl WalletState {
    /// The initial, disconnected state
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A connected state
    pub fn connected(address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            address: Some(address.into()),
            chain_id: Some(chain_id),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Abbreviated address for compact display, e.g. `0x742d...f44e`
    pub fn short_address(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        let chars: Vec<char> = address.chars().collect();
        if chars.len() <= 10 {
            return Some(address.to_string());
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        Some(format!("{}...{}", head, tail))
    }

    /// Human-readable network name
    pub fn network_name(&self) -> Option<&'static str> {
        self.chain_id.and_then(network_name)
    }
}

/// Name of a known network
pub fn network_name(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("Ethereum Mainnet"),
        5 => Some("Goerli Testnet"),
        11155111 => Some("Sepolia Testnet"),
        FHEVM_CHAIN_ID => Some("fhEVM Zama"),
        _ => None,
    }
}

fn lock_slot(slot: &Mutex<Option<String>>) -> MutexGuard<'_, Option<String>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clears the pending-provider slot when the attempt ends, cancelled or not
struct Pending<'a>(&'a Mutex<Option<String>>);

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        lock_slot(self.0).take();
    }
}

/// Simulated wallet connector
///
/// Only one connection attempt may be pending at a time; the provider being
/// connected is exposed through [`WalletConnector::connecting`] so callers can
/// disable their triggers.
pub struct WalletConnector {
    scheduler: Arc<dyn Scheduler>,
    delay: Duration,
    connecting: Mutex<Option<String>>,
}

impl WalletConnector {
    /// Create a new connector
    pub fn new(scheduler: Arc<dyn Scheduler>, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            connecting: Mutex::new(None),
        }
    }

    /// Provider currently being connected
    pub fn connecting(&self) -> Option<String> {
        lock_slot(&self.connecting).clone()
    }

    /// Connect through `provider_name`
    pub async fn connect(&self, provider_name: &str) -> Result<WalletState> {
        {
            let mut connecting = lock_slot(&self.connecting);
            if let Some(pending) = connecting.as_ref() {
                tracing::debug!(provider = provider_name, pending = %pending, "Connect rejected, attempt already pending");
                return Err(Error::ConnectionInProgress(pending.clone()));
            }
            *connecting = Some(provider_name.to_string());
        }
        let pending = Pending(&self.connecting);

        tracing::info!(provider = provider_name, "Connecting wallet");
        self.scheduler.delay(self.delay).await;

        drop(pending);
        let state = WalletState::connected(MOCK_ADDRESS, FHEVM_CHAIN_ID);
        tracing::info!(provider = provider_name, address = MOCK_ADDRESS, chain_id = FHEVM_CHAIN_ID, "Wallet connected");
        Ok(state)
    }

    /// Drop the connection
    pub fn disconnect(&self) -> WalletState {
        tracing::info!("Wallet disconnected");
        WalletState::disconnected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{InstantScheduler, TokioScheduler};

    #[test]
    fn test_initial_state() {
        let state = WalletState::disconnected();
        assert!(!state.is_connected());
        assert_eq!(state.address(), None);
        assert_eq!(state.chain_id(), None);
    }

    #[test]
    fn test_short_address() {
        let state = WalletState::connected(MOCK_ADDRESS, FHEVM_CHAIN_ID);
        assert_eq!(state.short_address().as_deref(), Some("0x742d...f44e"));
        assert_eq!(WalletState::disconnected().short_address(), None);
        assert_eq!(
            WalletState::connected("0x12", 1).short_address().as_deref(),
            Some("0x12")
        );
    }

    #[test]
    fn test_short_address_non_ascii() {
        let state = WalletState::connected("0xé€ü☃abcdef✓✓", FHEVM_CHAIN_ID);
        assert_eq!(state.short_address().as_deref(), Some("0xé€ü☃...ef✓✓"));
    }

    #[test]
    fn test_network_names() {
        assert_eq!(network_name(9090), Some("fhEVM Zama"));
        assert_eq!(network_name(11155111), Some("Sepolia Testnet"));
        assert_eq!(network_name(42), None);
    }

    #[tokio::test]
    async fn test_connect_then_disconnect() {
        let scheduler = Arc::new(InstantScheduler::new());
        let connector = WalletConnector::new(scheduler.clone(), Duration::from_millis(1500));

        let state = connector.connect("MetaMask").await.unwrap();
        assert!(state.is_connected());
        assert_eq!(state.address(), Some(MOCK_ADDRESS));
        assert_eq!(state.chain_id(), Some(9090));
        assert_eq!(state.network_name(), Some("fhEVM Zama"));
        assert_eq!(scheduler.requested(), vec![Duration::from_millis(1500)]);
        assert_eq!(connector.connecting(), None);

        assert_eq!(connector.disconnect(), WalletState::disconnected());
    }

    #[tokio::test]
    async fn test_provider_name_does_not_matter() {
        let connector = WalletConnector::new(Arc::new(InstantScheduler::new()), Duration::ZERO);
        let a = connector.connect("Rabby").await.unwrap();
        let b = connector.connect("Keplr").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_connect_rejected() {
        let connector = Arc::new(WalletConnector::new(
            Arc::new(TokioScheduler),
            Duration::from_millis(1500),
        ));

        let first = tokio::spawn({
            let connector = connector.clone();
            async move { connector.connect("MetaMask").await }
        });
        while connector.connecting().is_none() {
            tokio::task::yield_now().await;
        }

        assert_eq!(connector.connecting().as_deref(), Some("MetaMask"));
        let second = connector.connect("Phantom").await;
        assert!(matches!(second, Err(Error::ConnectionInProgress(ref p)) if p == "MetaMask"));

        let state = first.await.unwrap().unwrap();
        assert!(state.is_connected());
        assert_eq!(connector.connecting(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_connect_frees_slot() {
        let connector = Arc::new(WalletConnector::new(
            Arc::new(TokioScheduler),
            Duration::from_millis(1500),
        ));

        let task = tokio::spawn({
            let connector = connector.clone();
            async move { connector.connect("MetaMask").await }
        });
        while connector.connecting().is_none() {
            tokio::task::yield_now().await;
        }
        task.abort();
        let _ = task.await;

        assert_eq!(connector.connecting(), None);
        let state = connector.connect("Phantom").await.unwrap();
        assert!(state.is_connected());
    }
}
