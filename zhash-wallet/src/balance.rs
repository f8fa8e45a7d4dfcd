//! Balance provider
//!
//! Produces fresh balance snapshots from the token catalog. Each fetch waits a
//! simulated network latency and then nudges every balance by a small random
//! factor so the dashboard looks live.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::catalog::{supported_tokens, Token};
use crate::format;
use crate::scheduler::Scheduler;

/// Maximum relative jitter applied to public balances
pub const PUBLIC_JITTER: f64 = 0.02;

/// Maximum relative jitter applied to shielded balances
pub const SHIELDED_JITTER: f64 = 0.01;

/// Which balance of a token to aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceSelector {
    Public,
    Shielded,
}

impl BalanceSelector {
    /// The selected quantity of `token`
    pub fn quantity(&self, token: &Token) -> Decimal {
        match self {
            BalanceSelector::Public => token.public_balance,
            BalanceSelector::Shielded => token.shielded_balance,
        }
    }
}

/// Balance provider
pub struct BalanceProvider {
    scheduler: Arc<dyn Scheduler>,
    latency: Duration,
}

impl BalanceProvider {
    /// Create a new balance provider
    pub fn new(scheduler: Arc<dyn Scheduler>, latency: Duration) -> Self {
        Self { scheduler, latency }
    }

    /// Fetch a new snapshot of every catalog token
    pub async fn refresh(&self) -> Vec<Token> {
        self.scheduler.delay(self.latency).await;

        let tokens = jitter_snapshot(&supported_tokens(), &mut rand::thread_rng());
        tracing::debug!(tokens = tokens.len(), "Balance snapshot refreshed");
        tokens
    }
}

/// Build a new snapshot from `baseline` with independent per-balance jitter
pub fn jitter_snapshot<R: Rng + ?Sized>(baseline: &[Token], rng: &mut R) -> Vec<Token> {
    baseline
        .iter()
        .map(|token| Token {
            public_balance: jitter(token.public_balance, PUBLIC_JITTER, rng),
            shielded_balance: jitter(token.shielded_balance, SHIELDED_JITTER, rng),
            ..token.clone()
        })
        .collect()
}

fn jitter<R: Rng + ?Sized>(base: Decimal, spread: f64, rng: &mut R) -> Decimal {
    let factor = rng.gen_range((1.0 - spread)..(1.0 + spread));
    let factor = Decimal::try_from(factor).unwrap_or(Decimal::ONE);
    (base * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of `quantity × unit_price` over `tokens`
pub fn total(tokens: &[Token], selector: BalanceSelector) -> Decimal {
    tokens
        .iter()
        .map(|token| selector.quantity(token) * token.unit_price)
        .sum()
}

/// [`total`] formatted with exactly two fractional digits
pub fn total_value(tokens: &[Token], selector: BalanceSelector) -> String {
    format::fixed(total(tokens, selector), 2)
}
