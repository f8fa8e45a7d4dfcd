//! Portfolio dashboard state
//!
//! Holds the latest balance snapshot and keeps it fresh. Refreshes never
//! overlap: the periodic task and manual refreshes share a single in-flight
//! flag, and a refresh requested while another is outstanding is skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::balance::{total, BalanceProvider, BalanceSelector};
use crate::catalog::{supported_tokens, Token, TokenSymbol};
use crate::format;
use crate::guard::InFlight;

const MASK_LONG: &str = "••••••••";
const MASK_SHORT: &str = "••••";

/// Result of a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    /// Another refresh was already in flight
    Skipped,
}

/// Portfolio totals as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
    pub total_shielded: String,
    pub total_public: String,
}

/// One asset card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRow {
    pub symbol: TokenSymbol,
    pub name: String,
    pub logo_ref: String,
    pub price: String,
    pub public_balance: String,
    pub shielded_balance: String,
}

/// Dashboard state
pub struct Dashboard {
    provider: BalanceProvider,
    tokens: RwLock<Vec<Token>>,
    loaded: AtomicBool,
    refreshing: AtomicBool,
    show_values: AtomicBool,
}

impl Dashboard {
    pub fn new(provider: BalanceProvider) -> Self {
        Self {
            provider,
            tokens: RwLock::new(supported_tokens()),
            loaded: AtomicBool::new(false),
            refreshing: AtomicBool::new(false),
            show_values: AtomicBool::new(true),
        }
    }

    /// No snapshot has landed yet
    pub fn is_loading(&self) -> bool {
        !self.loaded.load(Ordering::Acquire)
    }

    /// A refresh of already-loaded balances is in flight
    pub fn is_refreshing(&self) -> bool {
        self.loaded.load(Ordering::Acquire) && self.refreshing.load(Ordering::Acquire)
    }

    pub fn show_values(&self) -> bool {
        self.show_values.load(Ordering::Relaxed)
    }

    /// Flip between showing and masking values
    pub fn toggle_values(&self) -> bool {
        !self.show_values.fetch_xor(true, Ordering::Relaxed)
    }

    /// Current snapshot
    pub async fn tokens(&self) -> Vec<Token> {
        self.tokens.read().await.clone()
    }

    /// Fetch a new snapshot unless one is already being fetched
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.refreshing) else {
            tracing::debug!("Balance refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let snapshot = self.provider.refresh().await;
        *self.tokens.write().await = snapshot;
        self.loaded.store(true, Ordering::Release);
        RefreshOutcome::Updated
    }

    /// Totals for the header card
    pub async fn summary(&self) -> PortfolioSummary {
        let tokens = self.tokens.read().await;
        if !self.show_values() {
            return PortfolioSummary {
                total_shielded: MASK_LONG.to_string(),
                total_public: MASK_SHORT.to_string(),
            };
        }
        PortfolioSummary {
            total_shielded: format::grouped(total(&tokens, BalanceSelector::Shielded), 2),
            total_public: format::grouped(total(&tokens, BalanceSelector::Public), 2),
        }
    }

    /// Per-asset cards
    pub async fn rows(&self) -> Vec<TokenRow> {
        let show = self.show_values();
        let balance = |value| {
            if show {
                format::fixed(value, 2)
            } else {
                MASK_SHORT.to_string()
            }
        };

        self.tokens
            .read()
            .await
            .iter()
            .map(|token| TokenRow {
                symbol: token.symbol,
                name: token.name.clone(),
                logo_ref: token.logo_ref.clone(),
                price: format::grouped(token.unit_price, 2),
                public_balance: balance(token.public_balance),
                shielded_balance: balance(token.shielded_balance),
            })
            .collect()
    }

    /// Load immediately, then refresh every `interval` until the handle is dropped
    pub fn spawn_auto_refresh(self: &Arc<Self>, interval: Duration) -> AutoRefresh {
        let dashboard = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                dashboard.refresh().await;
            }
        });
        tracing::debug!(?interval, "Balance auto-refresh started");
        AutoRefresh { task }
    }
}

/// Handle to the periodic refresh task; the task stops when this is dropped
pub struct AutoRefresh {
    task: JoinHandle<()>,
}

impl AutoRefresh {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Balance auto-refresh stopped");
    }
}
