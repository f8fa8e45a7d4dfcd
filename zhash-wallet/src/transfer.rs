//! Private transfer flow
//!
//! A transfer moves through `Idle -> Encrypting -> Sending -> Success` and back
//! to `Idle` on reset. The transitions themselves are a pure function of the
//! current phase and an event; [`TransferFlow`] feeds the events in after the
//! simulated delays.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::catalog::{find_token, TokenSymbol};
use crate::format;
use crate::scheduler::Scheduler;
use crate::wallet::WalletState;

/// Protocol royalty, 0.01% of the transferred amount
pub const ROYALTY_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Fractional digits shown for the royalty fee
pub const FEE_DISPLAY_DP: u32 = 6;

/// Royalty owed on `amount`
pub fn royalty_fee(amount: Decimal) -> Decimal {
    amount * ROYALTY_RATE
}

/// Transfer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPhase {
    Idle,
    Encrypting,
    Sending,
    Success,
}

/// Events that drive the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEvent {
    /// The form was submitted
    Submit,
    /// Local encryption of the amount finished
    Encrypted,
    /// The transaction was broadcast
    Broadcast,
    /// The user asked for a new transfer
    Reset,
}

impl TransferPhase {
    /// Next phase for `event`, or `None` if the event does not apply here
    pub fn on(self, event: TransferEvent) -> Option<TransferPhase> {
        match (self, event) {
            (TransferPhase::Idle, TransferEvent::Submit) => Some(TransferPhase::Encrypting),
            (TransferPhase::Encrypting, TransferEvent::Encrypted) => Some(TransferPhase::Sending),
            (TransferPhase::Sending, TransferEvent::Broadcast) => Some(TransferPhase::Success),
            (TransferPhase::Success, TransferEvent::Reset) => Some(TransferPhase::Idle),
            _ => None,
        }
    }

    /// Whether a transfer is under way
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TransferPhase::Encrypting | TransferPhase::Sending)
    }
}

/// Why a submit did not start a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    WalletDisconnected,
    InvalidAmount,
    MissingRecipient,
    /// A transfer is already running or awaiting reset
    NotIdle,
}

/// Result of submitting the transfer form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started,
    Rejected(Rejection),
}

/// Details of a finished transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub token: TokenSymbol,
    /// Amount as entered
    pub amount: String,
    pub recipient: String,
    /// Royalty fee, six fractional digits
    pub fee: String,
}

/// State of a single transfer form interaction
///
/// The phase only changes through [`TransferSession::begin`] and
/// [`TransferSession::reset`]; the timed steps in between are fed in by
/// [`TransferFlow`].
///
/// ```compile_fail
/// use zhash_wallet::transfer::{TransferEvent, TransferSession};
///
/// let mut session = TransferSession::default();
/// session.apply(TransferEvent::Submit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSession {
    selected_token: TokenSymbol,
    amount: String,
    recipient: String,
    phase: TransferPhase,
    receipt: Option<TransferReceipt>,
}

impl Default for TransferSession {
    fn default() -> Self {
        Self::new(TokenSymbol::ALL[0])
    }
}

impl TransferSession {
    pub fn new(selected_token: TokenSymbol) -> Self {
        Self {
            selected_token,
            amount: String::new(),
            recipient: String::new(),
            phase: TransferPhase::Idle,
            receipt: None,
        }
    }

    pub fn selected_token(&self) -> TokenSymbol {
        self.selected_token
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    /// Set once the transfer reaches [`TransferPhase::Success`]
    pub fn receipt(&self) -> Option<&TransferReceipt> {
        self.receipt.as_ref()
    }

    fn editable(&self) -> bool {
        self.phase == TransferPhase::Idle
    }

    /// Choose the token to send. Ignored outside `Idle`.
    pub fn select_token(&mut self, symbol: TokenSymbol) -> bool {
        if !self.editable() {
            return false;
        }
        self.selected_token = symbol;
        true
    }

    /// Ignored outside `Idle`.
    pub fn set_amount(&mut self, amount: &str) -> bool {
        if !self.editable() {
            return false;
        }
        self.amount = amount.to_string();
        true
    }

    /// Ignored outside `Idle`.
    pub fn set_recipient(&mut self, recipient: &str) -> bool {
        if !self.editable() {
            return false;
        }
        self.recipient = recipient.to_string();
        true
    }

    /// Fill the amount with the selected token's shielded balance
    pub fn fill_max(&mut self) -> bool {
        let max = format::fixed(find_token(self.selected_token).shielded_balance, 2);
        self.set_amount(&max)
    }

    /// The entered amount, if it parses to a strictly positive number
    pub fn parsed_amount(&self) -> Option<Decimal> {
        Decimal::from_str(self.amount.trim())
            .ok()
            .filter(|amount| amount.is_sign_positive() && !amount.is_zero())
    }

    /// Royalty owed on the entered amount
    pub fn fee(&self) -> Option<Decimal> {
        self.parsed_amount().map(royalty_fee)
    }

    /// Fee as displayed next to the amount field
    pub fn fee_display(&self) -> String {
        match self.fee() {
            Some(fee) => format::fixed(fee, FEE_DISPLAY_DP),
            None => "0.00".to_string(),
        }
    }

    /// Validate the form and leave `Idle`
    pub fn begin(&mut self, wallet: &WalletState) -> SubmitOutcome {
        let rejection = if self.phase != TransferPhase::Idle {
            Some(Rejection::NotIdle)
        } else if !wallet.is_connected() {
            Some(Rejection::WalletDisconnected)
        } else if self.parsed_amount().is_none() {
            Some(Rejection::InvalidAmount)
        } else if self.recipient.trim().is_empty() {
            Some(Rejection::MissingRecipient)
        } else {
            None
        };

        if let Some(rejection) = rejection {
            tracing::debug!(?rejection, phase = ?self.phase, "Transfer submit ignored");
            return SubmitOutcome::Rejected(rejection);
        }

        self.apply(TransferEvent::Submit);
        SubmitOutcome::Started
    }

    /// Feed an event into the phase machine. Returns whether it applied.
    fn apply(&mut self, event: TransferEvent) -> bool {
        let Some(next) = self.phase.on(event) else {
            return false;
        };
        tracing::info!(from = ?self.phase, to = ?next, token = %self.selected_token, "Transfer phase changed");
        self.phase = next;

        match next {
            TransferPhase::Success => {
                self.receipt = Some(TransferReceipt {
                    token: self.selected_token,
                    amount: self.amount.clone(),
                    recipient: self.recipient.clone(),
                    fee: self.fee_display(),
                });
            }
            TransferPhase::Idle => {
                self.amount.clear();
                self.recipient.clear();
                self.receipt = None;
            }
            TransferPhase::Encrypting | TransferPhase::Sending => {}
        }
        true
    }

    /// Start over after a successful transfer, keeping the selected token
    pub fn reset(&mut self) -> bool {
        self.apply(TransferEvent::Reset)
    }
}

/// Drives a [`TransferSession`] through its timed phases
pub struct TransferFlow {
    session: Arc<RwLock<TransferSession>>,
    scheduler: Arc<dyn Scheduler>,
    encrypt_delay: Duration,
    send_delay: Duration,
}

impl TransferFlow {
    pub fn new(scheduler: Arc<dyn Scheduler>, encrypt_delay: Duration, send_delay: Duration) -> Self {
        Self {
            session: Arc::new(RwLock::new(TransferSession::default())),
            scheduler,
            encrypt_delay,
            send_delay,
        }
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> TransferSession {
        self.session.read().await.clone()
    }

    /// Edit the session in place
    pub async fn update<R>(&self, edit: impl FnOnce(&mut TransferSession) -> R) -> R {
        let mut session = self.session.write().await;
        edit(&mut session)
    }

    /// Submit the form and run the transfer to completion
    ///
    /// Returns as soon as the submit is rejected; otherwise resolves once the
    /// session has reached [`TransferPhase::Success`]. The timed steps run on
    /// their own task, so dropping the returned future does not stop the
    /// transfer.
    pub async fn submit(&self, wallet: &WalletState) -> SubmitOutcome {
        let outcome = self.session.write().await.begin(wallet);
        if outcome != SubmitOutcome::Started {
            return outcome;
        }

        let driver = tokio::spawn(drive(
            Arc::clone(&self.session),
            Arc::clone(&self.scheduler),
            self.encrypt_delay,
            self.send_delay,
        ));
        if let Err(err) = driver.await {
            tracing::error!(error = %err, "Transfer driver stopped");
        }
        outcome
    }

    /// Start a new transfer after success
    pub async fn reset(&self) -> bool {
        self.session.write().await.reset()
    }
}

async fn drive(
    session: Arc<RwLock<TransferSession>>,
    scheduler: Arc<dyn Scheduler>,
    encrypt_delay: Duration,
    send_delay: Duration,
) {
    scheduler.delay(encrypt_delay).await;
    session.write().await.apply(TransferEvent::Encrypted);

    scheduler.delay(send_delay).await;
    session.write().await.apply(TransferEvent::Broadcast);
}
